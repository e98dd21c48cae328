use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use assetctl_client::{
    Action, AssetClient, ClientConfig, Entity, EquipoFilter, FileStore, MemoryLocation, RecordId,
    ReportFormat, ResponsableFilter, SessionStore, TextFilter, UploadFile, UsuarioFilter, View,
    load_summary,
};

#[derive(Parser)]
#[command(name = "assetctl")]
#[command(about = "Asset inventory client", long_about = None)]
struct Cli {
    /// Location the client boots at, e.g. `/reset-password/<token>`
    #[arg(long, global = true, default_value = "/")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in and the current view
    Status,
    /// Sign in and remember the user
    Login {
        username: String,
        #[arg(long, env = "ASSETCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the signed-in user
    Logout,
    /// Switch to another view of the current universe
    Navigate { view: View },
    /// List an entity collection
    List {
        entity: Entity,
        #[command(flatten)]
        filter: ListArgs,
    },
    Get { entity: Entity, id: RecordId },
    /// Create a record from a JSON object
    Create {
        entity: Entity,
        #[arg(long)]
        data: String,
    },
    /// Update a record from a JSON object
    Update {
        entity: Entity,
        id: RecordId,
        #[arg(long)]
        data: String,
    },
    Delete { entity: Entity, id: RecordId },
    /// Allowed field values for equipos or usuarios
    Enums { entity: Entity },
    /// Counts and recent equipos
    Dashboard,
    /// Upload a file and print its server path and URL
    Upload {
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Download a report to a file
    Report {
        entity: Entity,
        #[arg(long, default_value = "pdf")]
        format: ReportFormat,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Ask for a password reset email
    Forgot { identifier: String },
    /// Check a reset token (defaults to the one in `--url`)
    ValidateToken { token: Option<String> },
    /// Set a new password with a reset token (defaults to the one in `--url`)
    ResetPassword {
        token: Option<String>,
        #[arg(long, env = "ASSETCTL_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(clap::Args)]
struct ListArgs {
    /// Free-text search
    #[arg(long)]
    q: Option<String>,
    #[arg(long)]
    documento: Option<String>,
    #[arg(long)]
    role: Option<String>,
    #[arg(long)]
    tipo: Option<String>,
    #[arg(long)]
    estado: Option<String>,
    #[arg(long)]
    empresa_id: Option<i64>,
    #[arg(long)]
    responsable_entrega_id: Option<i64>,
    #[arg(long)]
    ubicacion_id: Option<i64>,
    #[arg(long)]
    usuario_autoriza_id: Option<i64>,
    #[arg(long)]
    registrado_por_id: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    assetctl_observability::init_with(config.log_format);

    let store: Arc<dyn SessionStore> = Arc::new(match &config.session_file {
        Some(path) => FileStore::new(path),
        None => FileStore::open_default()?,
    });
    let location = Arc::new(MemoryLocation::new(cli.url));
    let mut client = AssetClient::boot(&config, store, location)?;

    run(&mut client, cli.command).await
}

async fn run(client: &mut AssetClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Status => print_status(client),
        Commands::Login { username, password } => {
            let user = client.sign_in(&username, &password).await?;
            println!("signed in as {} ({})", user.username, user.role.as_str());
        }
        Commands::Logout => {
            client.sign_out();
            println!("signed out");
        }
        Commands::Navigate { view } => {
            let session = client.session_mut();
            if !session.navigate(view) {
                bail!("view '{view}' is not reachable from '{}'", session.view());
            }
            println!("{}", session.view());
        }
        Commands::List { entity, filter } => {
            require_signed_in(client)?;
            let resource = client.gateway().resource(entity);
            let body = match entity {
                Entity::Empresas | Entity::Ubicaciones => {
                    resource.list(&TextFilter { q: filter.q }).await?
                }
                Entity::Responsables => {
                    let filter = ResponsableFilter {
                        q: filter.q,
                        documento: filter.documento,
                    };
                    resource.list(&filter).await?
                }
                Entity::Usuarios => {
                    let filter = UsuarioFilter {
                        q: filter.q,
                        role: filter.role,
                    };
                    resource.list(&filter).await?
                }
                Entity::Equipos => resource.list(&equipo_filter(filter)).await?,
            };
            print_json(&body)?;
        }
        Commands::Get { entity, id } => {
            require_signed_in(client)?;
            print_json(&client.gateway().resource(entity).get(id).await?)?;
        }
        Commands::Create { entity, data } => {
            client.ensure_allowed(Action::Create)?;
            let body = parse_object(&data)?;
            print_json(&client.gateway().resource(entity).create(&body).await?)?;
        }
        Commands::Update { entity, id, data } => {
            client.ensure_allowed(Action::Update)?;
            let body = parse_object(&data)?;
            print_json(&client.gateway().resource(entity).update(id, &body).await?)?;
        }
        Commands::Delete { entity, id } => {
            client.ensure_allowed(Action::Delete)?;
            print_json(&client.gateway().resource(entity).delete(id).await?)?;
        }
        Commands::Enums { entity } => {
            require_signed_in(client)?;
            match entity {
                Entity::Equipos => print_json(&client.gateway().equipo_enums().await?)?,
                Entity::Usuarios => print_json(&client.gateway().usuario_enums().await?)?,
                other => bail!("no enum metadata for '{other}'"),
            }
        }
        Commands::Dashboard => {
            require_signed_in(client)?;
            print_json(&load_summary(client.gateway()).await?)?;
        }
        Commands::Upload { path, mime } => {
            require_signed_in(client)?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut file = UploadFile::new(file_name, bytes);
            if let Some(mime) = mime {
                file = file.with_mime(mime);
            }
            let uploaded = client.gateway().upload_file(file).await?;
            match uploaded.file.as_deref() {
                Some(server_path) => {
                    println!("{server_path}");
                    println!("{}", client.gateway().build_file_url(server_path));
                }
                None => bail!("upload accepted but no file path was returned"),
            }
        }
        Commands::Report {
            entity,
            format,
            output,
        } => {
            require_signed_in(client)?;
            let bytes = client.gateway().download_report(entity, format).await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("wrote {} bytes to {}", bytes.len(), output.display());
        }
        Commands::Forgot { identifier } => {
            print_json(&client.gateway().request_password_reset(&identifier).await?)?;
        }
        Commands::ValidateToken { token } => {
            let token = reset_token(client, token)?;
            print_json(&client.gateway().validate_reset_token(&token).await?)?;
        }
        Commands::ResetPassword { token, password } => {
            let token = reset_token(client, token)?;
            print_json(&client.gateway().reset_password(&token, &password).await?)?;
            if client.session_mut().back_to_login() {
                println!("password updated; sign in again");
            }
        }
    }
    Ok(())
}

fn print_status(client: &AssetClient) {
    let session = client.session();
    match session.user() {
        Some(user) => {
            println!("signed in as {} ({})", user.username, user.role.as_str());
            if let Some(caps) = session.capabilities() {
                let allowed: Vec<&str> = caps.allowed().iter().map(|a| a.as_str()).collect();
                println!("allowed: {}", allowed.join(", "));
            }
        }
        None => println!("signed out"),
    }
    println!("view: {}", session.view());
    if !session.reset_token().is_empty() {
        println!("reset token: present");
    }
    println!("service: {}", client.gateway().base_url());
}

fn require_signed_in(client: &AssetClient) -> anyhow::Result<()> {
    if !client.session().is_authenticated() {
        bail!("not signed in; run `assetctl login <username>` first");
    }
    Ok(())
}

fn reset_token(client: &AssetClient, explicit: Option<String>) -> anyhow::Result<String> {
    let token = explicit.unwrap_or_else(|| client.session().reset_token().to_string());
    if token.is_empty() {
        bail!("no reset token given and none found in --url");
    }
    Ok(token)
}

fn equipo_filter(args: ListArgs) -> EquipoFilter {
    EquipoFilter {
        tipo: args.tipo,
        estado: args.estado,
        texto: args.q,
        empresa_id: args.empresa_id,
        responsable_entrega_id: args.responsable_entrega_id,
        ubicacion_id: args.ubicacion_id,
        usuario_autoriza_id: args.usuario_autoriza_id,
        registrado_por_id: args.registrado_por_id,
    }
}

fn parse_object(raw: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
