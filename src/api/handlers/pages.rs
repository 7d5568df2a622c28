use axum::extract::Path;
use axum::response::Html;

const SHELL_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>PocketBoss</title>
</head>"#;

/// Dashboard shell. The route gate has already checked for the auth cookie.
pub async fn dashboard() -> Html<String> {
    Html(format!(
        "{SHELL_HEAD}\n<body data-page=\"dashboard\"><main id=\"app\"></main></body>\n</html>\n"
    ))
}

pub async fn dashboard_section(Path(section): Path<String>) -> Html<String> {
    let section: String = section
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_'))
        .collect();
    Html(format!(
        "{SHELL_HEAD}\n<body data-page=\"dashboard\" data-section=\"{section}\"><main id=\"app\"></main></body>\n</html>\n"
    ))
}

pub async fn login() -> Html<String> {
    Html(format!(
        "{SHELL_HEAD}\n<body data-page=\"login\"><main id=\"app\"></main></body>\n</html>\n"
    ))
}
