#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::time::Duration;

use argh::FromArgs;

use smb_share_access::{DeleteOutcome, RetryPolicy, ShareClient, ShareConfig, SmbConnector};

#[derive(FromArgs)]
#[argh(description = "
where positional is the address of the SMB host.

Access a SMB share as guest")]
struct Args {
    #[argh(
        option,
        short = 's',
        default = r#""guest".to_string()"#,
        description = "specify share"
    )]
    share: String,
    #[argh(option, short = 'p', default = "139", description = "specify port")]
    port: u16,
    #[argh(
        option,
        short = 'd',
        default = r#"PathBuf::from(".")"#,
        description = "local directory for downloaded files"
    )]
    local_dir: PathBuf,
    #[argh(
        option,
        short = 'r',
        default = "5",
        description = "connection attempts before giving up"
    )]
    retries: u32,
    #[argh(positional, description = "address of the SMB host")]
    server: String,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Get(GetArgs),
    Put(PutArgs),
    Write(WriteArgs),
    Rm(RmArgs),
    Exists(ExistsArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "list", description = "list files in the share root")]
struct ListArgs {}

#[derive(FromArgs)]
#[argh(subcommand, name = "get", description = "download a file")]
struct GetArgs {
    #[argh(switch, short = 'c', description = "print the file content")]
    content: bool,
    #[argh(positional, description = "remote file name")]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "put", description = "upload a local file")]
struct PutArgs {
    #[argh(switch, short = 'n', description = "do not overwrite an existing file")]
    no_overwrite: bool,
    #[argh(positional, description = "local file")]
    local: PathBuf,
    #[argh(positional, description = "remote file name")]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "write", description = "write text to a remote file")]
struct WriteArgs {
    #[argh(positional, description = "remote file name")]
    name: String,
    #[argh(positional, description = "text to write")]
    text: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "rm", description = "delete files matching a name")]
struct RmArgs {
    #[argh(positional, description = "remote file name, may contain `*` and `?`")]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "exists", description = "check whether a file exists")]
struct ExistsArgs {
    #[argh(positional, description = "remote file name")]
    name: String,
}

fn main() -> anyhow::Result<()> {
    assert!(env_logger::builder().try_init().is_ok());
    let args: Args = argh::from_env();

    info!(
        "initializing client with server {}:{} and share {}",
        args.server, args.port, args.share
    );
    let client = ShareClient::new(
        ShareConfig::new(args.server.as_str())
            .port(args.port)
            .share(args.share.as_str())
            .local_dir(args.local_dir.as_path()),
        SmbConnector::default(),
    )
    .retry_policy(
        RetryPolicy::default()
            .max_attempts(args.retries)
            .max_delay(Duration::from_secs(30)),
    );

    match args.command {
        Command::List(_) => {
            for file in client.list_files()? {
                println!("{}", file.name());
            }
        }
        Command::Get(get) if get.content => println!("{}", client.fetch_text(&get.name)?),
        Command::Get(get) => println!("{}", client.fetch_path(&get.name)?.display()),
        Command::Put(put) => {
            let outcome = client.store(&put.name, put.local.as_path(), !put.no_overwrite)?;
            println!("{} bytes written", outcome.bytes());
        }
        Command::Write(write) => {
            let outcome = client.write_text(&write.name, &write.text)?;
            println!("{} bytes written", outcome.bytes());
        }
        Command::Rm(rm) => match client.delete(&rm.name)? {
            DeleteOutcome::Deleted(n) => println!("{} file(s) deleted", n),
            DeleteOutcome::NotFound => println!("no file matching {}", rm.name),
        },
        Command::Exists(exists) => println!("{}", client.exists(&exists.name)?),
    }

    Ok(())
}
