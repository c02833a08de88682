//! End-to-end tests for `HttpTaskClient` against a server bound on a real socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use common::CountingGateway;
use taskboard::api::{serve_with_shutdown, AppState};
use taskboard::client::{
    ClientError, HttpTaskClient, StatusFilter, TaskApi, TaskDraft, TaskFormView, TaskListView,
};
use taskboard::task::TaskFilter;
use taskboard::{Config, Priority};

struct TestServer {
    base_url: String,
    gateway: Arc<CountingGateway>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn spawn_server() -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let gateway = CountingGateway::new();
    let state = Arc::new(AppState::new(Config::default(), gateway.clone()));
    let (shutdown, signal) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve_with_shutdown(listener, state, async move {
        let _ = signal.await;
    }));

    TestServer {
        base_url,
        gateway,
        shutdown,
        handle,
    }
}

fn draft(title: &str, priority: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "Сверить цифры & отправить".to_string(),
        priority: priority.to_string(),
        due_date: "2023-12-15".to_string(),
    }
}

#[tokio::test]
async fn test_client_creates_and_lists_with_filters() {
    let server = spawn_server().await;
    let client = HttpTaskClient::new(&server.base_url).unwrap();

    let report = client.create_task(&draft("Отчёт за квартал", "high")).await.unwrap();
    assert_eq!(report.title, "Отчёт за квартал");
    assert_eq!(report.description, "Сверить цифры & отправить");
    assert_eq!(report.priority, Priority::High);
    assert_eq!(report.due_date, Utc.with_ymd_and_hms(2023, 12, 15, 0, 0, 0).unwrap());
    assert!(!report.completed);

    let chores = client.create_task(&draft("Полить цветы", "low")).await.unwrap();

    let all = client.list_tasks(&TaskFilter::default()).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![chores.id, report.id]);

    let high = client
        .list_tasks(&TaskFilter {
            priority: Some(Priority::High),
            completed: None,
        })
        .await
        .unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, report.id);

    let open_low = client
        .list_tasks(&TaskFilter {
            priority: Some(Priority::Low),
            completed: Some(false),
        })
        .await
        .unwrap();
    assert_eq!(open_low.len(), 1);
    assert_eq!(open_low[0].id, chores.id);

    let done = client
        .list_tasks(&TaskFilter {
            priority: None,
            completed: Some(true),
        })
        .await
        .unwrap();
    assert!(done.is_empty());

    assert_eq!(server.gateway.mutations(), 2);
}

#[tokio::test]
async fn test_client_surfaces_validation_envelope() {
    let server = spawn_server().await;
    let client = HttpTaskClient::new(&server.base_url).unwrap();

    let invalid = TaskDraft {
        title: String::new(),
        priority: "urgent".to_string(),
        due_date: "someday".to_string(),
        ..draft("ignored", "low")
    };
    let err = client.create_task(&invalid).await.unwrap_err();

    match &err {
        ClientError::Api { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Ошибка валидации данных");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
    assert_eq!(err.user_message("fallback"), "Ошибка валидации данных");
    assert_eq!(server.gateway.calls(), 0);
}

#[tokio::test]
async fn test_views_over_http() {
    let server = spawn_server().await;
    let client = Arc::new(HttpTaskClient::new(&server.base_url).unwrap());

    let (sender, mut events) = broadcast::channel(4);
    let mut form = TaskFormView::new(Arc::clone(&client)).with_notifier(sender);
    let mut list = TaskListView::new(Arc::clone(&client));
    list.mount().await;
    assert!(list.tasks().is_empty());
    assert_eq!(list.error(), None);

    form.draft = draft("Купить билеты", "medium");
    let created = form.submit().await.expect("task created");
    assert_eq!(form.draft, TaskDraft::default());

    let event = events.recv().await.unwrap();
    list.on_task_created(&event).await;
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.tasks()[0].id, created.id);

    list.set_status_filter(StatusFilter::Completed).await;
    assert!(list.tasks().is_empty());
}

#[tokio::test]
async fn test_server_stops_on_shutdown_signal() {
    let server = spawn_server().await;
    let client = HttpTaskClient::new(&server.base_url).unwrap();
    client.list_tasks(&TaskFilter::default()).await.unwrap();

    server.shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());

    let err = client.list_tasks(&TaskFilter::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
}
