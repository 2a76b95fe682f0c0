use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use news_client::{FindPostsQuery, NewsClient, NewsClientError, Post};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "news-cli", version, about = "CLI клиент для news-svc")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true, env = "NEWS_SERVER_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Печатать ответы в формате JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Имя сервиса.
    Info,
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Обновление поста по id; отсутствующий пост будет создан.
    Put {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Удаление поста по id.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Список постов, от новых к старым.
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        /// Нижняя граница created_at (RFC 3339), включительно.
        #[arg(long, value_parser = parse_time)]
        from: Option<DateTime<Utc>>,
        /// Верхняя граница created_at (RFC 3339), включительно.
        #[arg(long, value_parser = parse_time)]
        to: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let client = NewsClient::new(normalize_server(cli.server))
        .context("не удалось создать HTTP-клиент")?;
    let json = cli.json;

    match cli.command {
        Command::Info => {
            let info = client.service_info().await.map_err(map_client_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("service_name: {}", info.service_name);
            }
        }
        Command::Create { title, content } => {
            let post = client
                .create_post(&title, &content)
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post, json)?;
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            print_post("Пост", &post, json)?;
        }
        Command::Put { id, title, content } => {
            client
                .upsert_post(&id, &title, &content)
                .await
                .map_err(map_client_error)?;
            println!("Пост сохранён: id={id}");
        }
        Command::Delete { id } => {
            client.delete_post(&id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::List {
            limit,
            offset,
            from,
            to,
        } => {
            let query = FindPostsQuery {
                limit,
                offset,
                from,
                to,
            };
            let posts = client.find_posts(&query).await.map_err(map_client_error)?;
            print_list(&posts, json)?;
        }
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|err| format!("ожидается время в формате RFC 3339: {err}"))
}

fn map_client_error(err: NewsClientError) -> anyhow::Error {
    let message = match err {
        NewsClientError::NotFound(message) => format!("пост не найден: {message}"),
        NewsClientError::Conflict(message) => format!("конфликт: {message}"),
        NewsClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        NewsClientError::Server(message) => format!("ошибка сервера: {message}"),
        NewsClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_post(title: &str, post: &Post, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(post)?);
        return Ok(());
    }

    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("content: {}", post.content);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
    Ok(())
}

fn print_list(posts: &[Post], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    println!("Постов: {}", posts.len());
    for post in posts {
        println!("- [{}] {} ({})", post.id, post.title, post.created_at);
    }
    Ok(())
}
