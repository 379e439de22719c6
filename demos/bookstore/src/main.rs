//! Bookstore walkthrough: a wired bean container plus an intercepted book
//! service, followed by the smaller container drills (self-invocation,
//! prototype scope, lazy construction, destruction order).
//!
//! Run with `RUST_LOG=info cargo run -p bookstore`.

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cradle_aop::{
    order, AspectRegistryBuilder, AuditInterceptor, CallError, CallScope, Dispatcher,
    InvocationIdInterceptor, MetricsInterceptor, MetricsRegistry, RequireRoleInterceptor,
    RetryInterceptor, TransactionalInterceptor,
};
use cradle_di::{BeanDefinition, Container, ContainerBuilder};

#[derive(Debug, Clone)]
struct Book {
    title: String,
    author: String,
}

#[derive(Default)]
struct BookRepository {
    books: RwLock<Vec<Book>>,
}

impl BookRepository {
    fn save(&self, book: Book) {
        self.books.write().push(book);
    }

    fn delete(&self, title: &str) -> bool {
        let mut books = self.books.write();
        let before = books.len();
        books.retain(|book| book.title != title);
        books.len() < before
    }

    fn find(&self, title: &str) -> Option<Book> {
        self.books
            .read()
            .iter()
            .find(|book| book.title == title)
            .cloned()
    }

    fn count(&self) -> usize {
        self.books.read().len()
    }
}

struct BookService {
    repository: Arc<BookRepository>,
}

impl BookService {
    fn add_book(&self, title: &str, author: &str) -> Result<Book, CallError> {
        if title.trim().is_empty() {
            return Err(CallError::Validation("book title must not be empty".into()));
        }
        let book = Book {
            title: title.to_string(),
            author: author.to_string(),
        };
        self.repository.save(book.clone());
        Ok(book)
    }

    fn remove_book(&self, title: &str) -> Result<bool, CallError> {
        Ok(self.repository.delete(title))
    }

    fn find_book(&self, title: &str) -> Option<Book> {
        self.repository.find(title)
    }
}

/// Self-invocation drill target: `daily_report` calls `summary` on plain
/// `self`, so the inner call never passes through the dispatch handle.
struct ReportService {
    repository: Arc<BookRepository>,
}

impl ReportService {
    fn summary(&self) -> String {
        format!("{} book(s) in stock", self.repository.count())
    }

    fn daily_report(&self) -> String {
        format!("daily report: {}", self.summary())
    }
}

/// Prototype drill bean: every resolve mints a new id
struct InstanceTag {
    id: String,
}

/// Lazy drill bean: logs its own construction so deferral is visible
struct HeavyAnalyzer {
    corpus_size: usize,
}

impl HeavyAnalyzer {
    fn new() -> Self {
        tracing::info!("constructing HeavyAnalyzer (expensive)");
        Self { corpus_size: 90_000 }
    }
}

/// Primary-disambiguation drill bean: two instances share this type
struct Catalog {
    label: String,
}

/// Destruction drill bean
struct ConnectionPool {
    label: String,
}

fn build_container() -> Result<Container, cradle_di::DiError> {
    let mut builder = ContainerBuilder::new();

    builder.register(BeanDefinition::new("book_repository", |_| {
        Ok(BookRepository::default())
    }))?;
    builder.register(
        BeanDefinition::new("book_service", |container| {
            Ok(BookService {
                repository: container.resolve_typed("book_repository")?,
            })
        })
        .depends_on("book_repository"),
    )?;
    builder.register(
        BeanDefinition::new("report_service", |container| {
            Ok(ReportService {
                repository: container.resolve_typed("book_repository")?,
            })
        })
        .depends_on("book_repository"),
    )?;

    builder.register(
        BeanDefinition::new("instance_tag", |_| {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(8);
            Ok(InstanceTag { id })
        })
        .prototype(),
    )?;
    builder.register(BeanDefinition::new("heavy_analyzer", |_| Ok(HeavyAnalyzer::new())).lazy())?;

    builder.register(
        BeanDefinition::new("main_catalog", |_| {
            Ok(Catalog {
                label: "main".to_string(),
            })
        })
        .primary(),
    )?;
    builder.register(BeanDefinition::new("archive_catalog", |_| {
        Ok(Catalog {
            label: "archive".to_string(),
        })
    }))?;

    builder.register(
        BeanDefinition::new("read_pool", |_| {
            Ok(ConnectionPool {
                label: "read".to_string(),
            })
        })
        .on_destroy(|pool: &ConnectionPool| {
            tracing::info!(pool = %pool.label, "draining connection pool");
        }),
    )?;
    builder.register(
        BeanDefinition::new("write_pool", |_| {
            Ok(ConnectionPool {
                label: "write".to_string(),
            })
        })
        .on_destroy(|pool: &ConnectionPool| {
            tracing::info!(pool = %pool.label, "draining connection pool");
        }),
    )?;

    builder.build()
}

fn build_dispatcher(metrics: Arc<MetricsRegistry>) -> Result<Dispatcher, cradle_aop::BindingError> {
    let mut aspects = AspectRegistryBuilder::new();

    aspects.bind(
        "book_service.*",
        order::INVOCATION_ID,
        Arc::new(InvocationIdInterceptor::new()),
    )?;
    aspects.bind(
        "book_service.*",
        order::AUDIT,
        Arc::new(AuditInterceptor::new()),
    )?;
    aspects.bind(
        "book_service.*",
        order::RETRY,
        Arc::new(RetryInterceptor::new(3, Duration::from_millis(300))),
    )?;

    aspects.bind(
        "book_service.remove_book",
        order::TRANSACTIONAL,
        Arc::new(TransactionalInterceptor::new()),
    )?;
    aspects.bind(
        "book_service.remove_book",
        order::SECURITY,
        Arc::new(RequireRoleInterceptor::new("ADMIN")),
    )?;
    aspects.bind(
        "book_service.remove_book",
        order::METRICS,
        Arc::new(MetricsInterceptor::named(metrics.clone(), "book.remove")),
    )?;
    aspects.bind(
        "book_service.add_book",
        order::METRICS,
        Arc::new(MetricsInterceptor::new(metrics)),
    )?;

    aspects.bind(
        "report_service.*",
        order::INVOCATION_ID,
        Arc::new(InvocationIdInterceptor::new()),
    )?;
    aspects.bind(
        "report_service.*",
        order::AUDIT,
        Arc::new(AuditInterceptor::new()),
    )?;

    Ok(Dispatcher::new(aspects.build()))
}

fn run_bookstore(container: &Container, dispatcher: &Dispatcher) -> Result<(), CallError> {
    let service: Arc<BookService> = container
        .resolve_typed("book_service")
        .map_err(CallError::failed)?;
    let books = dispatcher.wrap("book_service", service);

    let user = CallScope::with_role("USER");
    let admin = CallScope::with_role("ADMIN");

    tracing::info!("--- adding books as USER ---");
    for (title, author) in [
        ("Dune", "Frank Herbert"),
        ("Hyperion", "Dan Simmons"),
    ] {
        let added = books.invoke(
            "add_book",
            &user,
            vec![title.to_string(), author.to_string()],
            |service| service.add_book(title, author),
        )?;
        tracing::info!(title = %added.title, author = %added.author, "added");
    }

    tracing::info!("--- removing as USER is denied ---");
    match books.invoke(
        "remove_book",
        &user,
        vec!["Dune".to_string()],
        |service| service.remove_book("Dune"),
    ) {
        Err(CallError::AuthorizationDenied { .. }) => {
            tracing::info!("denied as expected, nothing removed")
        }
        other => tracing::error!(?other, "expected an authorization denial"),
    }

    tracing::info!("--- removing as ADMIN succeeds ---");
    let removed = books.invoke(
        "remove_book",
        &admin,
        vec!["Dune".to_string()],
        |service| service.remove_book("Dune"),
    )?;
    tracing::info!(removed, "remove finished");

    tracing::info!("--- an empty title fails validation and exhausts the retries ---");
    match books.invoke("add_book", &user, vec![String::new()], |service| {
        service.add_book("", "Nobody")
    }) {
        Err(CallError::RetryExhausted { attempts, source }) => {
            tracing::info!(attempts, %source, "gave up as expected")
        }
        other => tracing::error!(?other, "expected retry exhaustion"),
    }

    let found = books.invoke(
        "find_book",
        &user,
        vec!["Hyperion".to_string()],
        |service| Ok(service.find_book("Hyperion")),
    )?;
    tracing::info!(found = ?found.map(|book| book.title), "lookup");

    Ok(())
}

fn run_self_invocation_drill(
    container: &Container,
    dispatcher: &Dispatcher,
) -> Result<(), CallError> {
    let service: Arc<ReportService> = container
        .resolve_typed("report_service")
        .map_err(CallError::failed)?;
    let reports = dispatcher.wrap("report_service", service);

    tracing::info!("--- self-invocation drill ---");
    // One START/END pair: the inner summary() call runs on plain self
    let report = reports.invoke("daily_report", &CallScope::new(), vec![], |service| {
        Ok(service.daily_report())
    })?;
    tracing::info!(%report, "via daily_report, summary was not intercepted");

    // Calling summary through the handle does run its chain
    let summary = reports.invoke("summary", &CallScope::new(), vec![], |service| {
        Ok(service.summary())
    })?;
    tracing::info!(%summary, "direct external call, intercepted");

    Ok(())
}

fn run_container_drills(container: &Container) -> Result<(), cradle_di::DiError> {
    tracing::info!("--- prototype drill ---");
    let first: Arc<InstanceTag> = container.resolve_typed("instance_tag")?;
    let second: Arc<InstanceTag> = container.resolve_typed("instance_tag")?;
    tracing::info!(first = %first.id, second = %second.id, "two resolves, two instances");

    tracing::info!("--- lazy drill ---");
    let analyzer = container.resolve_lazy::<HeavyAnalyzer>("heavy_analyzer")?;
    tracing::info!("heavy_analyzer not constructed yet");
    let analyzer = analyzer.try_get()?;
    tracing::info!(corpus_size = analyzer.corpus_size, "constructed on first access");

    tracing::info!("--- primary disambiguation drill ---");
    let by_type: Arc<Catalog> = container.resolve_by_type()?;
    let by_name: Arc<Catalog> = container.resolve_typed("archive_catalog")?;
    tracing::info!(primary = %by_type.label, qualified = %by_name.label, "catalog lookups");

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let container = build_container()?;
    let metrics = Arc::new(MetricsRegistry::new());
    let dispatcher = build_dispatcher(metrics.clone())?;

    run_bookstore(&container, &dispatcher)?;
    run_self_invocation_drill(&container, &dispatcher)?;
    run_container_drills(&container)?;

    tracing::info!("--- metrics ---");
    for (key, count) in metrics.snapshot() {
        tracing::info!(%key, count, total = ?metrics.total_duration(&key), "metric");
    }

    tracing::info!("--- closing the container ---");
    container.close();
    container.close(); // idempotent

    Ok(())
}
