use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context};
use chargen::api::{export_json, load_rules, sheet, validate_json};
use chargen::derived::spellcasting_status;
use chargen::{CharacterDraft, RuleTables, SlotBudget, SpellcastingStatus, WizardStep};
use chrono::Utc;
use clap::{Parser, Subcommand};
use encoding_rs::Encoding;
use tracing::{debug, Level};

#[derive(Subcommand)]
enum Cmd {
    /// Write an empty draft as JSON
    New {
        /// Character name to start with
        #[arg(long)]
        name: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print derived stats and outstanding errors for a draft
    Sheet {
        /// Path to draft JSON
        #[arg(long)]
        draft: PathBuf,
        /// Directory with races/classes/backgrounds/spells YAML
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// List validation errors; exits non-zero when any remain
    Validate {
        /// Path to draft JSON
        #[arg(long)]
        draft: PathBuf,
        /// Directory with races/classes/backgrounds/spells YAML
        #[arg(long)]
        rules: Option<PathBuf>,
        /// basics | abilities | equipment | spells | details | review
        #[arg(long)]
        step: Option<String>,
    },
    /// Show a class's spell slots at a level
    Slots {
        #[arg(long)]
        class: String,
        #[arg(long, default_value_t = 1)]
        level: i32,
        /// Directory with races/classes/backgrounds/spells YAML
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Export a finished character
    Export {
        /// Path to draft JSON
        #[arg(long)]
        draft: PathBuf,
        /// Directory with races/classes/backgrounds/spells YAML
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Output file, or a directory to write `<name>_character.json` into
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(name = "chargen")]
#[command(about = "Character creation harness")]
struct Cli {
    /// Log rejected edits and rule loading to stderr
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Cmd::New { name, out } => {
            let draft = CharacterDraft::new();
            let draft = match name {
                Some(name) => draft.update_meta(|m| m.name = name),
                None => draft,
            };
            let json = draft.to_json()?;
            match out {
                Some(path) => write_file(&path, &json)?,
                None => println!("{}", json),
            }
        }
        Cmd::Sheet {
            draft,
            rules,
            compact,
        } => {
            let tables = rules_from(rules.as_deref())?;
            let draft = read_draft(&draft)?;
            let result = sheet(&draft, &tables);
            if compact {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Cmd::Validate { draft, rules, step } => {
            let tables = rules_from(rules.as_deref())?;
            let step = match step.as_deref() {
                Some(s) => Some(
                    WizardStep::parse(s).with_context(|| format!("unknown step '{}'", s))?,
                ),
                None => None,
            };
            let text = read_text_auto(&draft)?;
            let errors = validate_json(&text, &tables, step)?;
            if errors.is_empty() {
                println!("OK");
            } else {
                for e in &errors {
                    println!("[{}] {}", e.step, e.message);
                }
                bail!("{} validation error(s)", errors.len());
            }
        }
        Cmd::Slots {
            class,
            level,
            rules,
        } => {
            let tables = rules_from(rules.as_deref())?;
            let profile = tables
                .class(&class)
                .with_context(|| format!("unknown class '{}'", class))?;
            let status = spellcasting_status(profile, level);
            println!("{}", describe_slots(&profile.name, level, status));
        }
        Cmd::Export { draft, rules, out } => {
            let tables = rules_from(rules.as_deref())?;
            let draft = read_draft(&draft)?;
            let now = Utc::now();
            let json = export_json(&draft, &tables, now)?;
            match out {
                Some(path) if path.is_dir() => {
                    let file = path.join(draft.export(&tables, now).file_name());
                    write_file(&file, &json)?;
                    println!("{}", file.display());
                }
                Some(path) => {
                    write_file(&path, &json)?;
                    println!("{}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}

fn rules_from(dir: Option<&Path>) -> anyhow::Result<RuleTables> {
    let dir = dir.map(|d| d.to_string_lossy().into_owned());
    load_rules(dir.as_deref())
}

fn describe_slots(class: &str, level: i32, status: SpellcastingStatus) -> String {
    match status {
        SpellcastingStatus::Absent => format!("{} level {}: no spellcasting", class, level),
        SpellcastingStatus::Locked { unlocks_at, .. } => format!(
            "{} level {}: spellcasting unlocks at level {}",
            class, level, unlocks_at
        ),
        SpellcastingStatus::Available {
            ability, budget, ..
        } => {
            let slots = match budget {
                SlotBudget::Slots { slots } => slots
                    .iter()
                    .take_while(|&&n| n > 0)
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join("/"),
                SlotBudget::Pact { slots, slot_level } => {
                    format!("{} pact slot(s) of level {}", slots, slot_level)
                }
            };
            format!(
                "{} level {}: {} ({}), max leveled spells {}",
                class,
                level,
                slots,
                ability.abbrev(),
                budget.max_leveled_spells()
            )
        }
    }
}

fn read_draft(path: &Path) -> anyhow::Result<CharacterDraft> {
    let text = read_text_auto(path)?;
    CharacterDraft::from_json(&text)
        .with_context(|| format!("failed to parse draft JSON: {}", path.display()))
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        debug!(encoding = enc.name(), "[CLI] stripped byte-order mark");
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn write_file(path: &Path, text: &str) -> anyhow::Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
