use std::path::PathBuf;
use std::process::ExitCode;

use aneka_hello::{Client, ClientOptions};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::keypair::Keypair;


/// Greets the hello program and prints how many times the payer’s account has
/// been greeted.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RPC endpoint of the Solana node.
    #[arg(long, env = "HELLO_RPC_URL",
          default_value = aneka_hello::client::DEFAULT_RPC_URL)]
    url: String,

    /// Websocket endpoint of the Solana node.
    #[arg(long, env = "HELLO_WS_URL",
          default_value = aneka_hello::client::DEFAULT_WS_URL)]
    ws_url: String,

    /// Keypair paying for the transactions.  Defaults to
    /// `~/.config/solana/id.json`.
    #[arg(long, env = "HELLO_KEYPAIR")]
    keypair: Option<PathBuf>,

    /// Address of the hello program.
    #[arg(long, env = "HELLO_PROGRAM_ID",
          default_value = aneka_hello::PROGRAM_ID)]
    program_id: Pubkey,

    /// Seed the data account address is derived with.
    #[arg(long, env = "HELLO_SEED", default_value = aneka_hello::SEED)]
    seed: String,

    /// Print log messages of the greeting transaction.
    #[arg(long)]
    show_logs: bool,
}


/// Error with the step of the run it happened at.
#[derive(Debug, derive_more::Display)]
#[display("{step} failed: {}: {err}", err.kind())]
struct Failure {
    step: &'static str,
    err: aneka_hello::Error,
}

type Result<T = (), E = Failure> = core::result::Result<T, E>;

/// Adds the step to errors of a result.
trait Step<T> {
    fn at(self, step: &'static str) -> Result<T>;
}

impl<T> Step<T> for aneka_hello::Result<T> {
    fn at(self, step: &'static str) -> Result<T> {
        self.map_err(|err| Failure { step, err })
    }
}


fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = <Args as clap::Parser>::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("starting runtime failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = runtime.block_on(run(args)) {
        eprintln!("{err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


/// Executes the program.
async fn run(args: Args) -> Result {
    let payer = read_keypair(args.keypair).at("reading keypair")?;
    let options = ClientOptions {
        rpc_url: Some(args.url),
        ws_url: Some(args.ws_url),
        payer,
        program_id: args.program_id,
        seed: args.seed,
    };

    let client = Client::connect(options).await.at("connecting")?;
    let signature = client.invoke().await.at("greeting")?;
    tracing::info!(%signature, "greeting confirmed");

    let greeting = client.read_state().await.at("reading account")?;
    println!("Account {} greets {} times", client.address(), greeting.counter);

    if args.show_logs {
        let logs = client.transaction_logs(&signature).await;
        for msg in logs.at("fetching logs")? {
            println!("{msg}");
        }
    }
    Ok(())
}


/// Reads keypair from given file or the Solana CLI’s default location.
fn read_keypair(path: Option<PathBuf>) -> aneka_hello::Result<Keypair> {
    let path = match path {
        Some(path) => path,
        None => {
            let home = std::env::var_os("HOME").ok_or_else(|| {
                aneka_hello::Error::InvalidInput(
                    "HOME not set; use --keypair".into(),
                )
            })?;
            PathBuf::from(home).join(".config/solana/id.json")
        }
    };
    solana_sdk::signer::keypair::read_keypair_file(&path).map_err(|err| {
        aneka_hello::Error::InvalidInput(format!("{}: {err}", path.display()))
    })
}
