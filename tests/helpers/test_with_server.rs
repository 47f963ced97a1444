#[macro_export]
macro_rules! test_config {
    () => {
        board_replies::config::AppConfig {
            db_namespace: "test".to_string(),
            db_database: "test".to_string(),
            db_password: None,
            db_username: None,
            db_url: "mem://".to_string(),
            server_port: 8080,
            reply_max_depth: 3,
            reply_admin_role: "admin".to_string(),
            tx_max_attempts: 30,
            tx_initial_backoff_ms: 2,
            sentry_project_link: None,
        }
    };
}

#[macro_export]
macro_rules! test_with_db {
    ($name:ident, |$ctx_state:ident, $config:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use board_replies::database::client::{Database, DbConfig};
            use board_replies::middleware::mw_ctx::create_ctx_state;
            use futures::FutureExt;
            use std::panic::resume_unwind;

            let $config = $crate::test_config!();

            let $ctx_state = {
                let db = Database::connect(DbConfig {
                    url: &$config.db_url,
                    database: &$config.db_database,
                    namespace: &$config.db_namespace,
                    password: $config.db_password.as_deref(),
                    username: $config.db_username.as_deref(),
                })
                .await
                .expect("db connects");
                board_replies::init::run_migrations(&db).await.unwrap();
                create_ctx_state(db, &$config)
            };

            let test_result = std::panic::AssertUnwindSafe(async {
                (|| async $body)().await;
            })
            .catch_unwind()
            .await;

            $ctx_state
                .db
                .client
                .query(format!("REMOVE DATABASE {};", $config.db_database))
                .await
                .expect("failed to remove database");

            if let Err(panic) = test_result {
                resume_unwind(panic);
            }
        }
    };
}

#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $config:ident| $body:block) => {
        $crate::test_with_db!($name, |$ctx_state, $config| {
            use axum_test::{TestServer, TestServerConfig};

            let routes_all = board_replies::init::main_router(&$ctx_state);
            let $server = TestServer::new_with_config(
                routes_all,
                TestServerConfig {
                    transport: None,
                    save_cookies: false,
                    expect_success_by_default: false,
                    restrict_requests_with_http_schema: false,
                    default_content_type: None,
                    default_scheme: None,
                },
            )
            .expect("Failed to create test server");

            $body
        });
    };
}
