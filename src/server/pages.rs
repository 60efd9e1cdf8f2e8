//! HTML pages served by the front-end.

use crate::storage::ArtifactName;

/// Upload form.
pub const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>Merge PDF Files</title>
    </head>
    <body>
        <h3>Select PDF files to merge:</h3>
        <form action="/merge" method="post" enctype="multipart/form-data">
            <input type="file" name="files" accept="application/pdf" multiple>
            <input type="submit" value="Submit">
        </form>
    </body>
</html>
"#;

/// Page linking to the download of a merged artifact.
pub fn success_page(artifact: &ArtifactName) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>Merge PDF Files - Success</title>
    </head>
    <body>
        <h3>Processing Complete!</h3>
        <p>The PDF files have been successfully merged.</p>
        <a href="/download/{artifact}">Download Merged PDF</a>
    </body>
</html>
"#
    )
}

/// Page shown when a merge fails.
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>Merge PDF Files - Error</title>
    </head>
    <body>
        <h3>Error: {}</h3>
        <a href="/">Try again</a>
    </body>
</html>
"#,
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
