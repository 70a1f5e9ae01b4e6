//! HTML for the new-tab and onboarding pages

use crate::render::{Opacity, PageView, BACKGROUND_IMAGE_ID, TEXT_ID};

const STYLE: &str = r#"
      html, body { margin: 0; height: 100%; background: #111; overflow: hidden; }
      #background-image {
        position: fixed; inset: 0; width: 100%; height: 100%;
        object-fit: cover; transition: opacity 0.6s ease-in;
      }
      #default-copy {
        position: fixed; inset: 0; display: flex; align-items: center;
        justify-content: center; color: #eee; font: 1.25rem system-ui, sans-serif;
        transition: opacity 0.3s;
      }
"#;

const DEFAULT_COPY: &str = "Fetching a fresh photo from Unsplash…";

/// Standalone document for one new-tab page
pub fn render_html(view: &PageView) -> String {
    let overlay_opacity = if view.overlay_visible { "1" } else { "0" };

    let background = match &view.background {
        Some(element) => {
            let opacity = match element.opacity {
                Opacity::Transparent => "0",
                Opacity::Visible => "1",
            };
            format!(
                r#"    <img id="{}" alt="" src="{}" style="opacity: {}">"#,
                BACKGROUND_IMAGE_ID,
                escape_attr(&element.image),
                opacity
            )
        }
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>New Tab</title>
    <style>{style}</style>
  </head>
  <body>
    <p id="{text_id}" style="opacity: {overlay_opacity}">{copy}</p>
{background}
  </body>
</html>
"#,
        style = STYLE,
        text_id = TEXT_ID,
        overlay_opacity = overlay_opacity,
        copy = DEFAULT_COPY,
        background = background,
    )
}

/// Onboarding page showing one example image; clicking loads another
pub fn render_onboarding_html(example_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Welcome</title>
  </head>
  <body>
    <h1>Every new tab, a new photo</h1>
    <a id="example-image" href="/onboarding" title="A random image from Unsplash">
      <img src="{}" alt="" style="max-width: 100%; border-radius: 1rem">
    </a>
  </body>
</html>
"#,
        escape_attr(example_url)
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::BackgroundElement;

    #[test]
    fn test_render_with_background() {
        let view = PageView {
            background: Some(BackgroundElement {
                image: "data:image/png;base64,AA==".to_string(),
                opacity: Opacity::Visible,
            }),
            overlay_visible: false,
            generation: 1,
        };

        let html = render_html(&view);
        assert!(html.contains(r#"<img id="background-image""#));
        assert!(html.contains(r#"src="data:image/png;base64,AA==""#));
        assert!(html.contains(r#"style="opacity: 1">"#));
        assert!(html.contains(r#"<p id="default-copy" style="opacity: 0">"#));
    }

    #[test]
    fn test_render_overlay_only() {
        let view = PageView {
            background: None,
            overlay_visible: true,
            generation: 0,
        };

        let html = render_html(&view);
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"<p id="default-copy" style="opacity: 1">"#));
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a"b<c>&"#), "a&quot;b&lt;c&gt;&amp;");
    }

    #[test]
    fn test_onboarding_escapes_query() {
        let html = render_onboarding_html("https://source.unsplash.com/random/900x600?sea&sky");
        assert!(html.contains("900x600?sea&amp;sky"));
    }
}
