use std::path::PathBuf;

use postview::app::RunOptions;
use postview::model::UserId;

fn main() {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {message}\n\n{}", usage());
            std::process::exit(2);
        }
    };

    match cli.action {
        Action::Version => println!("postview {}", postview::VERSION),
        Action::Help => println!("{}", usage()),
        Action::Dump(selected) => match postview::app::dump(cli.options, selected) {
            Ok(html) => println!("{html}"),
            Err(err) => {
                eprintln!("error: {err:?}");
                std::process::exit(1);
            }
        },
        Action::Interactive => {
            if let Err(err) = postview::run(cli.options) {
                eprintln!("error: {err:?}");
                std::process::exit(1);
            }
        }
    }
}

enum Action {
    Interactive,
    Version,
    Help,
    Dump(Option<UserId>),
}

struct Cli {
    action: Action,
    options: RunOptions,
}

fn usage() -> String {
    "postview — Browse employees, their posts and comment threads from the terminal.\n\n  --version, -V        Show version and exit\n  --help,    -h        Show this help message\n  --offline            Use the built-in sample data instead of the network\n  --config <path>      Read configuration from <path>\n  --dump <user-id|->   Load one employee's posts and print them as HTML".to_string()
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut cli = Cli {
        action: Action::Interactive,
        options: RunOptions::default(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => cli.action = Action::Version,
            "--help" | "-h" => cli.action = Action::Help,
            "--offline" => cli.options.offline = true,
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                cli.options.config_file = Some(PathBuf::from(path));
            }
            "--dump" => {
                let raw = args.next().ok_or("--dump needs a user id or -")?;
                let selected = if raw == "-" {
                    None
                } else {
                    Some(
                        raw.parse::<UserId>()
                            .map_err(|_| format!("invalid user id {raw:?}"))?,
                    )
                };
                if !matches!(cli.action, Action::Version | Action::Help) {
                    cli.action = Action::Dump(selected);
                }
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(cli)
}
