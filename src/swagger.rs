use rocket_okapi::settings::UrlObject;
use rocket_okapi::swagger_ui::SwaggerUIConfig;

pub fn swagger_ui() -> SwaggerUIConfig {
    SwaggerUIConfig {
        urls: vec![
            UrlObject::new("Back-office API", "/api/openapi.json"),
            UrlObject::new("Admin", "/admin/openapi.json"),
        ],
        ..Default::default()
    }
}
