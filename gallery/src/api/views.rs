//! HTML rendering for the form page and upload responses.
//!
//! Templates are compiled once at startup into a [`minijinja::Environment`]. All templates use the
//! `.html` suffix so minijinja auto-escapes interpolated values; client-supplied filenames end up
//! in link labels and must not be able to inject markup. Hrefs are built from generated stored
//! names only and are marked `safe` so the slashes in them survive untouched.

use minijinja::{Environment, context};

use crate::api::models::uploads::UploadLink;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>Image Upload</title>
</head>
<body>
  <h1>Image Upload</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="image" />
    <button type="submit">Upload Image</button>
  </form>
  <h2>Gallery Upload</h2>
  <form action="/gallery" method="post" enctype="multipart/form-data">
    <input type="file" name="gallery" multiple />
    <button type="submit">Upload Gallery</button>
  </form>
  <p>Up to {{ max_gallery_files }} images per gallery upload.</p>
</body>
</html>"#;

const UPLOAD_TEMPLATE: &str = r#"File uploaded successfully: <a href="{{ link.href|safe }}">View File</a>"#;

const GALLERY_TEMPLATE: &str = r#"Files uploaded successfully: {% for link in links %}<a href="{{ link.href|safe }}">{{ link.label }}</a>{% if not loop.last %}, {% endif %}{% endfor %}"#;

/// Compiled page templates
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        env.add_template("upload.html", UPLOAD_TEMPLATE)?;
        env.add_template("gallery.html", GALLERY_TEMPLATE)?;
        Ok(Self { env })
    }

    /// The landing page with the single and gallery upload forms
    pub fn index(&self, max_gallery_files: usize) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(context! { max_gallery_files })
    }

    /// Response body for a successful single-file upload
    pub fn upload_success(&self, link: &UploadLink) -> Result<String, minijinja::Error> {
        self.env.get_template("upload.html")?.render(context! { link })
    }

    /// Response body for a successful gallery upload: one labeled link per file, comma separated
    pub fn gallery_success(&self, links: &[UploadLink]) -> Result<String, minijinja::Error> {
        self.env.get_template("gallery.html")?.render(context! { links })
    }
}
