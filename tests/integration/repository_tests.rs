//! Writes must be visible to every pooled connection as soon as they return

use bibliotheca_server::models::{
    book::CreateBook,
    enums::{RequestType, Role},
    user::{CreateUser, UpdateUser},
};
use chrono::Utc;

use crate::common::spawn_app;

const ROUNDS: i64 = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_writes_are_visible_on_other_connections() {
    let app = spawn_app().await;
    let repository = &app.state.services.repository;

    // Held for the whole test, so every write below runs on another connection
    let mut observer = repository.pool.acquire().await.expect("observer connection");

    for round in 0..ROUNDS {
        let library = repository
            .libraries
            .create(&format!("Branch {round}"))
            .await
            .expect("library created");
        let libraries: Vec<(String,)> = sqlx::query_as("SELECT name FROM libraries WHERE id = ?")
            .bind(library.id)
            .fetch_all(&mut *observer)
            .await
            .expect("read library");
        assert_eq!(libraries.len(), 1, "library {} not visible", library.id);

        let user = repository
            .users
            .create(
                &CreateUser {
                    name: format!("Reader {round}"),
                    email: format!("reader{round}@example.com"),
                    contact: None,
                    role: Role::Reader,
                    lib_id: library.id,
                    password: "unused".to_string(),
                },
                "hash-before",
            )
            .await
            .expect("user created");
        repository
            .users
            .update(user.id, &UpdateUser::default(), Some("hash-after"))
            .await
            .expect("user updated");
        let hashes: Vec<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_all(&mut *observer)
            .await
            .expect("read user");
        assert_eq!(hashes, vec![("hash-after".to_string(),)]);

        let isbn = format!("ISBN-{round}");
        repository
            .books
            .create(
                &CreateBook {
                    isbn: isbn.clone(),
                    lib_id: library.id,
                    title: "Visible".to_string(),
                    authors: None,
                    publisher: None,
                    version: None,
                    total_copies: 1,
                    available_copies: None,
                },
                1,
            )
            .await
            .expect("book created");

        let request = repository
            .requests
            .create(&isbn, user.id, RequestType::Borrow, None, Utc::now())
            .await
            .expect("request created");
        let requests: Vec<(i64,)> = sqlx::query_as("SELECT req_id FROM request_events WHERE req_id = ?")
            .bind(request.req_id)
            .fetch_all(&mut *observer)
            .await
            .expect("read request");
        assert_eq!(requests.len(), 1, "request {} not visible", request.req_id);
    }
}
