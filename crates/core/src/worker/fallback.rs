//! The offline page served for uncached entry points.

use crate::http::GatewayResponse;

/// Token tests and users can grep for in the offline page.
pub const OFFLINE_ERROR_CODE: &str = "134";

const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="utf-8">
    <title>Offline</title>
</head>
<body style="background:#333; color:white; font-family:sans-serif; text-align:center; padding-top: 50px;">
    <h1>ОФФЛАЙН: КЭШ НЕ НАЙДЕН</h1>
    <p>Для запуска игры в автономном режиме необходимо было посетить страницу хотя бы один раз, когда у вас было подключение к Интернету.</p>
    <p>Пожалуйста, подключитесь к сети и перезагрузите страницу.</p>
    <p>Код ошибки: 134</p>
    <p lang="en">OFFLINE: CACHE NOT FOUND. ERROR 134</p>
</body>
</html>
"#;

/// `200 OK`, `Content-Type: text/html`, fixed body. Never stored.
pub fn offline_page() -> GatewayResponse {
    GatewayResponse::new(200, "OK", OFFLINE_PAGE).with_header("Content-Type", "text/html")
}
