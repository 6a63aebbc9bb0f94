use html_escape::{encode_double_quoted_attribute as attr, encode_text};

/// The post as it goes into the page template.
pub struct BlogPost<'a> {
    pub topic: &'a str,
    pub image_url: &'a str,
    pub content: &'a str,
}

pub fn render_html(post: &BlogPost<'_>) -> String {
    let topic = encode_text(post.topic);
    let topic_attr = attr(post.topic);
    let image = if post.image_url.is_empty() {
        String::new()
    } else {
        format!("<img src=\"{}\" alt=\"{}\">", attr(post.image_url), topic_attr)
    };
    let body = post.content.replace("\r\n", "\n").replace('\n', "<br><br>");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{topic}</title>
    <meta name="description" content="A detailed blog post about {topic_attr}">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; margin: 40px; }}
        img {{ max-width: 100%; height: auto; }}
    </style>
</head>
<body>
    <h1>{topic}</h1>
    {image}
    <article>
        {body}
    </article>
</body>
</html>
"#
    )
}
