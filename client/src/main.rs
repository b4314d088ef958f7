//! `board`: command-line client for the bulletin board.
//!
//! Endpoints and the token file come from `BOARD_*` environment variables or
//! configuration files; the command line only selects what to do.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use board_client::ClientSettings;
use board_client::domain::{
    BulletinDraft, BulletinEntry, HydrateOutcome, ListStore, LoginCredentials, SessionHandle,
    SessionService,
};
use board_client::outbound::{FileTokenStore, HttpAuthService, HttpResourceClient, HttpTransport};
use board_client::telemetry::init_tracing;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

type Session = SessionService<HttpAuthService, FileTokenStore>;
type Posts = ListStore<BulletinEntry, HttpResourceClient<BulletinEntry>>;

/// `board` command arguments.
#[derive(Debug, Parser)]
#[command(name = "board", about = "Read and write bulletin board posts", version)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the token.
    Login(CredentialArgs),
    /// Create an account without logging in.
    Register(CredentialArgs),
    /// Forget the remembered token.
    Logout,
    /// Print posts, newest first.
    List {
        /// Number of pages to fetch.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Publish a post.
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Replace a post's title and content.
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Delete a post.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Show whether a token is remembered.
    Status,
}

#[derive(Debug, clap::Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

impl CredentialArgs {
    fn into_credentials(self) -> Result<LoginCredentials> {
        LoginCredentials::try_from_parts(&self.email, &self.password)
            .map_err(|error| eyre!("invalid credentials: {error}"))
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args.command))
}

async fn run(command: Command) -> Result<()> {
    let settings = ClientSettings::load_from_iter([OsString::from("board")])
        .map_err(|error| eyre!("load settings: {error}"))?;
    let session = session(&settings)?;
    match session.hydrate().wrap_err("restore session")? {
        HydrateOutcome::Expired => println!("stored session expired; log in again"),
        HydrateOutcome::Restored | HydrateOutcome::NoToken => {}
    }

    match command {
        Command::Login(credentials) => {
            session
                .login(&credentials.into_credentials()?)
                .await
                .wrap_err("login failed")?;
            println!("logged in");
        }
        Command::Register(credentials) => {
            session
                .register(&credentials.into_credentials()?)
                .await
                .wrap_err("registration failed")?;
            println!("registered; log in to continue");
        }
        Command::Logout => {
            session.logout().wrap_err("logout failed")?;
            println!("logged out");
        }
        Command::List { pages } => list(&posts(&settings, session.handle())?, pages).await?,
        Command::Post { title, content } => {
            let entry = posts(&settings, session.handle())?
                .create(&BulletinDraft { title, content })
                .await
                .wrap_err("create post")?;
            print_entry(&entry);
        }
        Command::Edit { id, title, content } => {
            let entry = posts(&settings, session.handle())?
                .update(&id, &BulletinDraft { title, content })
                .await
                .wrap_err("edit post")?
                .into_record();
            print_entry(&entry);
        }
        Command::Delete { id } => {
            posts(&settings, session.handle())?
                .remove(&id)
                .await
                .wrap_err("delete post")?;
            println!("deleted {id}");
        }
        Command::Status => {
            let handle = session.handle();
            if !handle.is_authenticated() {
                println!("authenticated=false");
            } else if handle.is_expired(&DefaultClock) {
                println!("authenticated=true expired=true");
            } else {
                println!("authenticated=true");
            }
        }
    }
    Ok(())
}

fn session(settings: &ClientSettings) -> Result<Session> {
    // Login and registration never carry a bearer token.
    let transport = HttpTransport::new(settings.timeout(), SessionHandle::default())
        .wrap_err("build HTTP client")?;
    let auth = HttpAuthService::new(transport, settings.auth_url()?);
    let store = FileTokenStore::new(settings.token_file());
    Ok(SessionService::new(
        Arc::new(auth),
        Arc::new(store),
        Arc::new(DefaultClock),
    ))
}

fn posts(settings: &ClientSettings, handle: SessionHandle) -> Result<Posts> {
    let transport =
        HttpTransport::new(settings.timeout(), handle).wrap_err("build HTTP client")?;
    let client = HttpResourceClient::new(transport, settings.resource_url()?);
    Ok(ListStore::new(Arc::new(client), settings.page_size()))
}

async fn list(posts: &Posts, pages: u32) -> Result<()> {
    for _ in 0..pages.max(1) {
        posts.fetch_next_page().await.wrap_err("fetch posts")?;
        if posts.reached_end() {
            break;
        }
    }
    for entry in posts.records() {
        print_entry(&entry);
    }
    let page = posts.pagination();
    println!(
        "page {} of {} ({} posts)",
        page.current_page, page.total_pages, page.total_records
    );
    Ok(())
}

fn print_entry(entry: &BulletinEntry) {
    println!(
        "{}\t{}\t{}",
        entry.id,
        entry.created_at.to_rfc3339(),
        entry.title
    );
}
