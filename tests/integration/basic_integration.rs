/// End-to-end tests through the public server API
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use habit_tracker::scheduler::run_daily_reset;
use habit_tracker::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::{tempdir, NamedTempFile};
use tower::ServiceExt;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn server_at(db_path: std::path::PathBuf) -> HabitTrackerServer {
        HabitTrackerServer::new(ServerConfig::new(db_path)).expect("Failed to create server")
    }

    #[tokio::test]
    async fn test_server_basic_workflow() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = server_at(temp_file.path().to_path_buf());
        let app = server.router();

        let (status, habit) = send(
            &app,
            "POST",
            "/api/habits",
            Some(json!({
                "name": "Read 20 pages",
                "timeOfDay": "night",
                "frequency": "weekly",
                "weekDays": [1, 3, 5],
                "reminderEnabled": true,
                "reminderTime": "21:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = habit["id"].as_str().unwrap().to_string();

        // Three days in a row ending today
        let today = today();
        for days_back in [2, 1, 0] {
            let date = (today - Duration::days(days_back))
                .format(DATE_FORMAT)
                .to_string();
            let (status, _) = send(
                &app,
                "POST",
                "/api/logs",
                Some(json!({ "habitId": id, "date": date, "completed": true })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        // Only the first two entries feed the current streak
        let stored = server.storage().get_habit(&HabitId::from_string(&id).unwrap()).unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(stored.longest_streak, 3);

        // Unmark yesterday: the run splits
        let yesterday = (today - Duration::days(1)).format(DATE_FORMAT).to_string();
        let (_, record) = send(
            &app,
            "POST",
            "/api/logs",
            Some(json!({ "habitId": id, "date": yesterday, "completed": false })),
        )
        .await;
        assert_eq!(record["completed"], false);
        assert!(record["completedAt"].is_null());

        let (_, stats) = send(&app, "GET", &format!("/api/habits/{id}/stats"), None).await;
        assert_eq!(stats["totalCompleted"], 2);
        assert_eq!(stats["currentStreak"], 1);
        assert_eq!(stats["longestStreak"], 1);

        // Delete cascades to the log
        let (status, _) = send(&app, "DELETE", &format!("/api/habits/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, logs) = send(&app, "GET", "/api/logs", None).await;
        assert!(logs.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_daily_reset_then_toggle() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = server_at(temp_file.path().to_path_buf());
        let app = server.router();

        for name in ["Walk", "Floss"] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/habits",
                Some(json!({ "name": name, "timeOfDay": "anytime", "frequency": "daily" })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let summary = run_daily_reset(server.storage(), today()).unwrap();
        assert_eq!(summary.habits_checked, 2);
        assert_eq!(summary.records_created, 2);

        let (_, logs) = send(&app, "GET", "/api/logs/today", None).await;
        let logs = logs.as_array().unwrap().clone();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l["completed"] == false));

        // Toggling reuses the record the reset job created
        let habit_id = logs[0]["habitId"].as_str().unwrap();
        let (_, record) = send(
            &app,
            "POST",
            "/api/logs",
            Some(json!({ "habitId": habit_id, "date": today().format(DATE_FORMAT).to_string(), "completed": true })),
        )
        .await;
        assert_eq!(record["id"], logs[0]["id"]);

        // A second reset run leaves the completion alone
        let summary = run_daily_reset(server.storage(), today()).unwrap();
        assert_eq!(summary.records_created, 0);
        let (_, logs) = send(&app, "GET", "/api/logs/today", None).await;
        let done = logs
            .as_array()
            .unwrap()
            .iter()
            .filter(|l| l["completed"] == true)
            .count();
        assert_eq!(done, 1);
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("data").join("habits.db");

        let id = {
            let server = server_at(db_path.clone());
            let (status, habit) = send(
                &server.router(),
                "POST",
                "/api/habits",
                Some(json!({ "name": "Sketch", "timeOfDay": "afternoon", "frequency": "daily" })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            habit["id"].as_str().unwrap().to_string()
        };

        // Second server with the same database path sees the habit
        let server = server_at(db_path);
        let (_, habits) = send(&server.router(), "GET", "/api/habits", None).await;
        assert_eq!(habits[0]["id"], id);
        assert_eq!(habits[0]["name"], "Sketch");
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = server_at(temp_file.path().to_path_buf());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("server did not shut down")
            .unwrap();
        assert!(result.is_ok());
    }
}
