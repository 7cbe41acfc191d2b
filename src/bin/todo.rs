use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

// Tokens from signup/login are cached here so later commands can
// authenticate without logging in again.
const TOKEN_FILE: &str = "token.txt";

/// Command-line client for the todo service.
#[derive(Parser)]
#[command(name = "todo")]
struct Cli {
    /// Base URL of the running server
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:8000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account and cache its token
    Signup { username: String, password: String },
    /// Log in and cache the token
    Login { username: String, password: String },
    /// Show the account behind the cached token
    Whoami,
    /// Create a todo
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List your todos
    List,
    /// Show one todo
    Get { id: i64 },
    /// Change fields of a todo; omitted fields are left alone
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Mark a todo as completed
    Done { id: i64 },
    /// Delete a todo
    Delete { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Command::Signup { username, password } => {
            let response = client
                .post(format!("{}/auth/signup", base))
                .json(&json!({ "username": username, "password": password }))
                .send()?;
            finish_auth(response)
        }
        Command::Login { username, password } => {
            let response = client
                .post(format!("{}/auth/token", base))
                .form(&[("username", username), ("password", password)])
                .send()?;
            finish_auth(response)
        }
        Command::Whoami => {
            let response = client
                .get(format!("{}/auth/whoami", base))
                .bearer_auth(load_token()?)
                .send()?;
            print_body(response)
        }
        Command::Add { title, description } => {
            let mut body = json!({ "title": title });
            if let Some(description) = description {
                body["description"] = json!(description);
            }
            let response = client
                .post(format!("{}/todos/", base))
                .bearer_auth(load_token()?)
                .json(&body)
                .send()?;
            print_body(response)
        }
        Command::List => {
            let response = client
                .get(format!("{}/todos/", base))
                .bearer_auth(load_token()?)
                .send()?;
            print_body(response)
        }
        Command::Get { id } => {
            let response = client
                .get(format!("{}/todos/{}", base, id))
                .bearer_auth(load_token()?)
                .send()?;
            print_body(response)
        }
        Command::Update {
            id,
            title,
            description,
            completed,
        } => {
            let mut fields = serde_json::Map::new();
            if let Some(title) = title {
                fields.insert("title".to_string(), json!(title));
            }
            if let Some(description) = description {
                fields.insert("description".to_string(), json!(description));
            }
            if let Some(completed) = completed {
                fields.insert("completed".to_string(), json!(completed));
            }
            let response = client
                .put(format!("{}/todos/{}", base, id))
                .bearer_auth(load_token()?)
                .json(&Value::Object(fields))
                .send()?;
            print_body(response)
        }
        Command::Done { id } => {
            let response = client
                .put(format!("{}/todos/{}", base, id))
                .bearer_auth(load_token()?)
                .json(&json!({ "completed": true }))
                .send()?;
            print_body(response)
        }
        Command::Delete { id } => {
            let response = client
                .delete(format!("{}/todos/{}", base, id))
                .bearer_auth(load_token()?)
                .send()?;
            print_body(response)
        }
    }
}

// Print the server's reply and, on signup/login, remember the token.
fn finish_auth(response: Response) -> Result<()> {
    let status = response.status();
    let body: Value = response.json().context("server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if let Some(token) = body.get("access_token").and_then(Value::as_str) {
        fs::write(TOKEN_FILE, token).context("could not write token file")?;
        println!("Token saved to {}", TOKEN_FILE);
    }

    if !status.is_success() {
        bail!("request failed with status {}", status);
    }
    Ok(())
}

fn load_token() -> Result<String> {
    if !Path::new(TOKEN_FILE).exists() {
        bail!("No saved token found. Please login first.");
    }
    let token = fs::read_to_string(TOKEN_FILE).context("could not read token file")?;
    Ok(token.trim().to_string())
}

fn print_body(response: Response) -> Result<()> {
    let status = response.status();
    let body: Value = response.json().context("server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("request failed with status {}", status);
    }
    Ok(())
}
