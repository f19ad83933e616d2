use std::fs;
use std::path::{Component, Path, PathBuf};

use http::HeaderValue;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::handler::{Handler, Next};
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, ResponseWriter};
use crate::status::Status;

/// Serves files from a directory for `GET` and `HEAD` requests.
///
/// The request path is percent-decoded before the lookup. Anything it cannot
/// serve (other methods, paths outside `prefix`, missing files, paths that are
/// not UTF-8 once decoded or that contain `..`) falls through to the rest of
/// the chain untouched, so it composes in front of application handlers.
///
/// ```rust
/// use strand::Chain;
/// use strand::middleware::Static;
///
/// let mut chain = Chain::new();
/// chain.add(Static::new("assets").prefix("/static").index("home.html"));
/// ```
#[derive(Clone, Debug)]
pub struct Static {
    dir: PathBuf,
    prefix: String,
    index: String,
}

impl Static {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), prefix: String::new(), index: "index.html".to_owned() }
    }

    /// Only serve paths under this URL prefix, which is stripped before the
    /// file lookup. `"/static"` matches `/static` and `/static/…` but not
    /// `/staticfoo`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_owned();
        self
    }

    /// File served when the path names a directory.
    pub fn index(mut self, file: impl Into<String>) -> Self {
        self.index = file.into();
        self
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = percent_decode_str(path).decode_utf8().ok()?;
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if !self.prefix.is_empty() && !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        let mut file = self.dir.clone();
        for component in Path::new(rest.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => file.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if file.is_dir() {
            file.push(&self.index);
        }
        file.is_file().then_some(file)
    }
}

impl Handler for Static {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        if !matches!(req.method(), Method::Get | Method::Head) {
            return next.run(rw, req);
        }
        let Some(file) = self.resolve(req.path()) else {
            return next.run(rw, req);
        };

        let contents = match fs::read(&file) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(file = %file.display(), "failed to read static file: {e}");
                return next.run(rw, req);
            }
        };

        let content_type = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(ContentType::OctetStream, ContentType::from_extension);

        debug!(file = %file.display(), size = contents.len(), "serving static file");
        rw.set_header(CONTENT_TYPE, content_type.header_value());
        // HEAD carries no body, so the length has to be stated.
        rw.set_header(CONTENT_LENGTH, HeaderValue::from(contents.len()));
        rw.write_header(Status::Ok);
        if *req.method() == Method::Get {
            rw.write(&contents);
        }
    }
}
