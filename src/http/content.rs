//! Static content resolution.
//!
//! Each MIME category is served from its own directory under a base
//! directory. The directory part of the request path is discarded: only the
//! basename is looked up inside the category's root, so `/a/b/logo.png` and
//! `/logo.png` name the same file.

use std::path::{Path, PathBuf};

/// Fallback when the extension is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Directory a MIME category is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRoot {
    Pages,
    Stylesheets,
    Images,
    Scripts,
    Certificates,
    Applications,
}

impl ContentRoot {
    /// Pick the root for a MIME type; `None` when the type is not served.
    pub fn for_mime(mime: &str) -> Option<Self> {
        let (main, sub) = mime.split_once('/')?;
        match (main, sub) {
            ("text", "html") => Some(Self::Pages),
            ("text", "css") => Some(Self::Stylesheets),
            ("text", "javascript") => Some(Self::Scripts),
            ("image", "png" | "jpeg" | "x-icon" | "vnd.microsoft.icon") => Some(Self::Images),
            ("application", "javascript") => Some(Self::Scripts),
            ("application", "x-x509-ca-cert") => Some(Self::Certificates),
            ("application", _) => Some(Self::Applications),
            _ => None,
        }
    }

    /// Directory relative to the content base.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Pages => "www",
            Self::Stylesheets => "static/css",
            Self::Images => "static/images",
            Self::Scripts => "static/js",
            Self::Certificates => "cert",
            Self::Applications => "apps",
        }
    }
}

/// Guess the MIME type of a request path from its extension.
pub fn mime_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// A resolved static file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub mime: String,
    pub file: PathBuf,
}

/// Maps request paths to files under a base directory.
#[derive(Debug, Clone)]
pub struct ContentRoots {
    base: PathBuf,
}

impl ContentRoots {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve a request path, or `None` when its type has no root or the
    /// path has no basename.
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        let mime = mime_for(path);
        let root = ContentRoot::for_mime(&mime)?;
        let name = Path::new(path).file_name()?;
        Some(Resolved {
            file: self.base.join(root.dir()).join(name),
            mime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_by_mime() {
        assert_eq!(ContentRoot::for_mime("text/html"), Some(ContentRoot::Pages));
        assert_eq!(ContentRoot::for_mime("text/css"), Some(ContentRoot::Stylesheets));
        assert_eq!(ContentRoot::for_mime("image/png"), Some(ContentRoot::Images));
        assert_eq!(ContentRoot::for_mime("image/x-icon"), Some(ContentRoot::Images));
        assert_eq!(ContentRoot::for_mime("application/javascript"), Some(ContentRoot::Scripts));
        assert_eq!(ContentRoot::for_mime("application/zip"), Some(ContentRoot::Applications));
        assert_eq!(ContentRoot::for_mime("text/plain"), None);
        assert_eq!(ContentRoot::for_mime("image/gif"), None);
        assert_eq!(ContentRoot::for_mime("video/mp4"), None);
        assert_eq!(ContentRoot::for_mime("garbage"), None);
    }

    #[test]
    fn test_resolve_flattens_directories() {
        let roots = ContentRoots::new("/srv");

        let page = roots.resolve("/deep/nested/index.html").unwrap();
        assert_eq!(page.mime, "text/html");
        assert_eq!(page.file, Path::new("/srv/www/index.html"));

        let css = roots.resolve("/css/styles.css").unwrap();
        assert_eq!(css.file, Path::new("/srv/static/css/styles.css"));

        let escape = roots.resolve("/../../etc/secret.png").unwrap();
        assert_eq!(escape.file, Path::new("/srv/static/images/secret.png"));
    }

    #[test]
    fn test_unknown_extension_goes_to_applications() {
        let roots = ContentRoots::new("base");
        let login = roots.resolve("/login").unwrap();
        assert_eq!(login.mime, OCTET_STREAM);
        assert_eq!(login.file, Path::new("base/apps/login"));
    }

    #[test]
    fn test_unsupported_type_is_unresolved() {
        let roots = ContentRoots::new("base");
        assert!(roots.resolve("/notes.txt").is_none());
    }
}
