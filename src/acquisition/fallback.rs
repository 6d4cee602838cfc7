//! Fallback URL variants tried after the basic chain and publisher sessions

use url::Url;

/// Path substitution applied when the host matches
struct PathRewrite {
    /// Host suffix the rewrite is limited to, `None` for any host
    host: Option<&'static str>,
    from: &'static str,
    to: &'static str,
    /// Append `.pdf` to the rewritten path
    append_pdf: bool,
}

const PATH_REWRITES: &[PathRewrite] = &[
    PathRewrite {
        host: None,
        from: "/doi/full/",
        to: "/doi/pdf/",
        append_pdf: false,
    },
    PathRewrite {
        host: None,
        from: "/doi/abs/",
        to: "/doi/pdf/",
        append_pdf: false,
    },
    PathRewrite {
        host: None,
        from: "/doi/epdf/",
        to: "/doi/pdfdirect/",
        append_pdf: false,
    },
    PathRewrite {
        host: None,
        from: "/doi/reader/",
        to: "/doi/pdf/",
        append_pdf: false,
    },
    PathRewrite {
        host: Some("springer.com"),
        from: "/article/",
        to: "/content/pdf/",
        append_pdf: true,
    },
    PathRewrite {
        host: Some("springer.com"),
        from: "/chapter/",
        to: "/content/pdf/",
        append_pdf: true,
    },
];

fn host_matches(url: &Url, suffix: &str) -> bool {
    url.host_str().is_some_and(|h| {
        let h = h.to_lowercase();
        h == suffix || h.ends_with(&format!(".{}", suffix))
    })
}

/// Ordered, de-duplicated variants of `url`, never including `url` itself
pub fn fallback_variants(url: &Url) -> Vec<Url> {
    let mut variants: Vec<Url> = Vec::new();
    let mut push = |candidate: Url| {
        if candidate != *url && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    for rewrite in PATH_REWRITES {
        if rewrite.host.is_some_and(|h| !host_matches(url, h)) {
            continue;
        }
        let path = url.path();
        if !path.contains(rewrite.from) {
            continue;
        }

        let mut rewritten = path.replacen(rewrite.from, rewrite.to, 1);
        if rewrite.append_pdf && !rewritten.to_lowercase().ends_with(".pdf") {
            rewritten = format!("{}.pdf", rewritten.trim_end_matches('/'));
        }

        let mut candidate = url.clone();
        candidate.set_path(&rewritten);
        push(candidate);
    }

    let already_download = url
        .query_pairs()
        .any(|(k, v)| k == "download" && v == "1");
    if !already_download {
        let mut candidate = url.clone();
        candidate.query_pairs_mut().append_pair("download", "1");
        push(candidate);
    }

    variants
}
