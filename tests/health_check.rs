mod common;

use actix_web::{test, App, web};
use chrono::DateTime;
use studymate_server::routes;

use common::{offline_state, test_settings, StubLlm};

#[actix_web::test]
async fn test_health_check() {
    // The pool is lazy: /health never touches the database
    let state = offline_state(test_settings(), StubLlm::replying(&[]));

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure)
    ).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(
        json["timestamp"].as_str().unwrap()
    ).is_ok());
    assert_eq!(json["database"]["total_connections"], 0);
}
