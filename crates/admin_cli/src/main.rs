use std::{error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{
    AccountType, Engine, LedgerRequest, NewCard, NewProductCmd, NewUserCmd, RequestFilter,
    RequestKind, RequestStatus, User,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use uuid::Uuid;

mod secret;

type Res<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "mahfaza_admin")]
#[command(about = "Back-office utilities for the mahfaza wallet")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./mahfaza.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create wallet accounts.
    #[command(subcommand)]
    User(UserCommand),
    /// Review the request queue.
    #[command(subcommand)]
    Requests(RequestsCommand),
    #[command(subcommand)]
    Network(NetworkCommand),
    #[command(subcommand)]
    Category(CategoryCommand),
    #[command(subcommand)]
    Cards(CardsCommand),
    #[command(subcommand)]
    Product(ProductCommand),
}

/// Phone number of the administrator performing the operation.
#[derive(Args, Debug)]
struct Operator {
    #[arg(long = "as", value_name = "PHONE")]
    admin_phone: String,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account; the password is asked on the terminal.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long, conflicts_with = "agent")]
        admin: bool,
        #[arg(long)]
        agent: bool,
    },
}

#[derive(Subcommand, Debug)]
enum RequestsCommand {
    List {
        #[command(flatten)]
        operator: Operator,
        /// `pending` (default), `approved` or `rejected`.
        #[arg(long, default_value = "pending")]
        status: String,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
    },
    Approve {
        #[command(flatten)]
        operator: Operator,
        id: Uuid,
        #[arg(long)]
        note: Option<String>,
    },
    Reject {
        #[command(flatten)]
        operator: Operator,
        id: Uuid,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum NetworkCommand {
    Create {
        #[command(flatten)]
        operator: Operator,
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        #[command(flatten)]
        operator: Operator,
        #[arg(long)]
        network: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
    },
}

#[derive(Subcommand, Debug)]
enum CardsCommand {
    /// Load cards from a CSV file with a `code` column and an optional
    /// `serial` column.
    Import {
        #[command(flatten)]
        operator: Operator,
        #[arg(long)]
        category: Uuid,
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    Create {
        #[command(flatten)]
        operator: Operator,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
        #[arg(long)]
        description: Option<String>,
        /// Units available; unlimited when omitted.
        #[arg(long)]
        stock: Option<i64>,
    },
}

#[derive(Debug, Deserialize)]
struct CardRow {
    code: String,
    #[serde(default)]
    serial: Option<String>,
}

fn read_cards(path: &PathBuf) -> Res<Vec<NewCard>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut cards = Vec::new();
    for row in reader.deserialize::<CardRow>() {
        let row = row?;
        let card = NewCard::new(row.code);
        cards.push(match row.serial.filter(|s| !s.is_empty()) {
            Some(serial) => card.serial(serial),
            None => card,
        });
    }
    Ok(cards)
}

async fn connect_db(database_url: &str) -> Res<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn admin(engine: &Engine, operator: &Operator) -> Res<User> {
    let user = engine.user_by_phone(&operator.admin_phone).await?;
    if !user.account_type.is_admin() {
        return Err(format!("{} is not an administrator", operator.admin_phone).into());
    }
    Ok(user)
}

fn print_request(request: &LedgerRequest) {
    println!(
        "{}  {:<12} {:<9} {:>10} fee {:>6}  {}  {}",
        request.id,
        request.kind.as_str(),
        request.status.as_str(),
        request.amount,
        request.fee,
        request.target.as_deref().unwrap_or("-"),
        request.details.as_deref().unwrap_or(""),
    );
}

#[tokio::main]
async fn main() -> Res<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(UserCommand::Create {
            name,
            phone,
            admin,
            agent,
        }) => {
            let account_type = if admin {
                AccountType::Admin
            } else if agent {
                AccountType::Agent
            } else {
                AccountType::Customer
            };
            let password = secret::new_password()?;
            let user = engine
                .new_user(NewUserCmd::new(name, phone, password).account_type(account_type))
                .await?;
            println!(
                "created {} {} ({})",
                user.account_type.as_str(),
                user.phone_number,
                user.id
            );
        }
        Command::Requests(RequestsCommand::List {
            operator,
            status,
            kind,
            limit,
        }) => {
            let admin = admin(&engine, &operator).await?;
            let filter = RequestFilter {
                status: Some(RequestStatus::try_from(status.as_str())?),
                kind: kind.as_deref().map(RequestKind::try_from).transpose()?,
                limit,
                ..RequestFilter::default()
            };
            let requests = engine.list_requests(admin.id, &filter).await?;
            if requests.is_empty() {
                println!("no requests");
            }
            for request in &requests {
                print_request(request);
            }
        }
        Command::Requests(RequestsCommand::Approve { operator, id, note }) => {
            let admin = admin(&engine, &operator).await?;
            let request = engine.approve_request(id, admin.id, note.as_deref()).await?;
            print_request(&request);
        }
        Command::Requests(RequestsCommand::Reject { operator, id, note }) => {
            let admin = admin(&engine, &operator).await?;
            let request = engine.reject_request(id, admin.id, note.as_deref()).await?;
            print_request(&request);
        }
        Command::Network(NetworkCommand::Create { operator, name }) => {
            let admin = admin(&engine, &operator).await?;
            let network = engine.new_network(admin.id, &name).await?;
            println!("created network: {} ({})", network.name, network.id);
        }
        Command::Category(CategoryCommand::Create {
            operator,
            network,
            name,
            price,
        }) => {
            let admin = admin(&engine, &operator).await?;
            let category = engine
                .new_card_category(admin.id, network, &name, price)
                .await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Cards(CardsCommand::Import {
            operator,
            category,
            file,
        }) => {
            let admin = admin(&engine, &operator).await?;
            let cards = read_cards(&file)?;
            let added = engine.add_cards(admin.id, category, cards).await?;
            println!("imported {added} cards");
        }
        Command::Product(ProductCommand::Create {
            operator,
            name,
            price,
            description,
            stock,
        }) => {
            let admin = admin(&engine, &operator).await?;
            let mut cmd = NewProductCmd::new(name, price);
            if let Some(description) = description {
                cmd = cmd.description(description);
            }
            if let Some(stock) = stock {
                cmd = cmd.stock(stock);
            }
            let product = engine.new_product(admin.id, cmd).await?;
            println!("created product: {} ({})", product.name, product.id);
        }
    }

    Ok(())
}
