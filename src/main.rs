use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sigblock::avatar::Avatar;
use sigblock::department::Department;
use sigblock::export::{DirectorySink, Exporter, PreviewDocument};
use sigblock::fields::{Field, SignatureFields};
use sigblock::preview::SignaturePreview;
use sigblock::state::{Action, FormState};
use sigblock::{format, ExportConfig};

#[derive(Parser)]
#[command(name = "sigblock", about = "Gerador de assinatura de e-mail", version)]
struct Cli {
    /// Export settings as JSON (missing keys keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the formatted signature block
    Preview {
        #[command(flatten)]
        fields: FieldArgs,
        /// Print the preview markup instead of text
        #[arg(long)]
        html: bool,
    },
    /// Render the signature block to a PNG file
    Export {
        #[command(flatten)]
        fields: FieldArgs,
        /// Directory the image is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Organization logo (PNG)
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,
    },
    /// List the department labels
    Departments,
    /// Run a single formatter on a value
    Format {
        kind: FormatKind,
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatKind {
    Name,
    Initials,
    Phone,
    Role,
}

#[derive(Args)]
struct FieldArgs {
    /// Fields as JSON ({"name": ..., "role": ..., "department": ..., ...})
    #[arg(long)]
    fields: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    role: Option<String>,
    /// Full label or acronym, e.g. SMEDU
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// Profile photo (PNG, JPEG, GIF, WebP or BMP; other types show initials)
    #[arg(long)]
    avatar: Option<PathBuf>,
}

impl FieldArgs {
    fn into_state(self, config: &ExportConfig) -> anyhow::Result<FormState> {
        let base = match &self.fields {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<SignatureFields>(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SignatureFields::default(),
        };
        let mut state = FormState::with_fields(base, config.revert_delay());

        if let Some(d) = &self.department {
            // Parse here so a typo is an error instead of a silently ignored input.
            let department = Department::parse_optional(d)?;
            state = state.apply(Action::SetDepartment(department));
        }
        let text_fields = [
            (Field::Name, self.name),
            (Field::Role, self.role),
            (Field::Phone, self.phone),
            (Field::Address, self.address),
        ];
        for (field, value) in text_fields {
            if let Some(v) = value {
                state = state.apply(Action::SetField(field, v));
            }
        }
        if let Some(path) = &self.avatar {
            state = state.apply(Action::SetAvatar(Avatar::from_path(path)?));
        }
        Ok(state)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };

    match cli.command {
        Command::Departments => {
            for d in Department::ALL {
                println!("{}", d);
            }
        }
        Command::Format { kind, value } => {
            let out = match kind {
                FormatKind::Name => format::format_display_name(&value),
                FormatKind::Initials => format::initials(&value),
                FormatKind::Phone => format::format_phone(&value),
                FormatKind::Role => format::capitalize_words(&value),
            };
            println!("{}", out);
        }
        Command::Preview { fields, html } => {
            let state = fields.into_state(&config)?;
            let preview = SignaturePreview::new(&state, &config);
            if html {
                print!("{}", preview.to_html());
            } else {
                print!("{}", preview.to_text());
            }
        }
        Command::Export { fields, out, logo, width } => {
            if logo.is_some() {
                config.logo_path = logo;
            }
            if let Some(w) = width {
                config.width = w;
            }
            config.validate()?;

            let state = fields.into_state(&config)?;
            if !state.can_download() {
                eprintln!("{}", sigblock::Error::IncompleteFields(state.fields().missing()));
                std::process::exit(2);
            }

            let preview = SignaturePreview::new(&state, &config);
            let mut surface = PreviewDocument::from_preview(&preview)?;
            let mut sink = DirectorySink::new(out);
            let exporter = Exporter::with_default_loader(&config);

            let (state, result) = exporter.download(state, &mut surface, &mut sink).await;
            eprintln!("{}", state.button().label());
            let report = result?;
            tracing::info!(
                images_loaded = report.images_loaded,
                images_failed = report.images_failed,
                "export finished"
            );
            println!("{}", report.path.display());
        }
    }
    Ok(())
}
