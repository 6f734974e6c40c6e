use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::PathBuf;

use fragvault_core::mock::{MockCustody, MockFragmentRegistry, MockGovernance};
use fragvault_core::{Address, ProposalState, Support};
use fragvault_engine::FragmentPool;

type DemoPool = FragmentPool<MockCustody, MockFragmentRegistry, MockGovernance>;

#[derive(Parser)]
#[command(name = "fragvault")]
#[command(about = "Fragvault pool demo over in-memory capability doubles", long_about = None)]
struct Cli {
    /// Path of the JSON pool-state file.
    #[arg(long, default_value = "fragvault.json")]
    state: PathBuf,

    /// Account the operation is performed as.
    #[arg(long = "as", default_value = "alice")]
    caller: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh pool and seed demo nouns to the caller
    Init {
        /// Number of nouns to seed.
        #[arg(long, default_value_t = 10)]
        nouns: u64,
    },

    /// Deposit nouns, minting fragment claims and fungible units
    Deposit {
        /// Noun ids to take into custody.
        #[arg(long, value_delimiter = ',', required = true)]
        nouns: Vec<u64>,
        /// Fragment sizes drawn against the pooled deposit budget.
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<u64>,
    },

    /// Split one claim into smaller claims plus fungible remainder
    Split {
        source: u64,
        #[arg(long, value_delimiter = ',', required = true)]
        sizes: Vec<u64>,
    },

    /// Merge claims and fungible units into one claim
    Combine {
        #[arg(long, value_delimiter = ',')]
        claims: Vec<u64>,
        #[arg(long, default_value_t = 0)]
        units: u64,
    },

    /// Burn exactly one million units per position and withdraw the nouns
    Redeem {
        #[arg(long, value_delimiter = ',')]
        claims: Vec<u64>,
        #[arg(long, default_value_t = 0)]
        units: u64,
        /// Target vault positions, strictly decreasing.
        #[arg(long, value_delimiter = ',', required = true)]
        positions: Vec<u64>,
    },

    /// Hand the vote power of claims to another account
    Delegate {
        #[arg(long, value_delimiter = ',', required = true)]
        claims: Vec<u64>,
        to: String,
    },

    /// Cast a vote (0 = against, 1 = for, 2 = abstain)
    CastVote {
        #[arg(long, value_delimiter = ',', required = true)]
        claims: Vec<u64>,
        proposal: u64,
        support: u8,
    },

    /// Transfer fungible units to another account
    Transfer { to: String, amount: u64 },

    /// Set the mock governance state of a proposal (upstream numbering)
    SetProposal { proposal: u64, state: u8 },

    /// Drop voting records for a proposal that is no longer open
    Prune { proposal: u64 },

    /// Pause or resume the deposit path
    Pause {
        #[arg(long)]
        off: bool,
    },

    /// Show custody list, balances, and tallies
    Status {
        /// Proposal to show tallies for.
        #[arg(long)]
        proposal: Option<u64>,
    },

    /// Print the audit event log
    Events,
}

fn load_pool(path: &PathBuf) -> Result<DemoPool> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("no pool state at {} (run `init` first)", path.display()))?;
    serde_json::from_str(&raw).context("pool state file is corrupt")
}

fn save_pool(path: &PathBuf, pool: &DemoPool) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(pool)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let caller = Address::new(cli.caller.clone());

    if let Commands::Init { nouns } = &cli.command {
        let mut custody = MockCustody::new(Address::from("fragvault-pool"));
        for noun in 0..*nouns {
            custody.seed(noun, caller.clone());
        }
        let pool = DemoPool::new(custody, MockFragmentRegistry::new(), MockGovernance::new());
        save_pool(&cli.state, &pool)?;
        info!("seeded {nouns} noun(s) to {caller}");
        println!("initialized pool at {}", cli.state.display());
        return Ok(());
    }

    let mut pool = load_pool(&cli.state)?;
    match &cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Deposit { nouns, sizes } => {
            let minted = pool.deposit(&caller, nouns, sizes)?;
            println!(
                "deposited {} noun(s); minted claims {:?}; unit balance {}",
                nouns.len(),
                minted,
                pool.unit_balance(&caller)
            );
        }
        Commands::Split { source, sizes } => {
            let minted = pool.split(&caller, *source, sizes)?;
            println!(
                "split claim {source} into {:?}; unit balance {}",
                minted,
                pool.unit_balance(&caller)
            );
        }
        Commands::Combine { claims, units } => {
            let result = pool.combine(&caller, claims, *units)?;
            println!(
                "combined into claim {result} ({} units)",
                pool.fragment_count(result)?
            );
        }
        Commands::Redeem {
            claims,
            units,
            positions,
        } => {
            let released = pool.redeem(&caller, claims, *units, positions)?;
            println!("redeemed noun(s) {released:?}");
        }
        Commands::Delegate { claims, to } => {
            pool.delegate_vote(&caller, claims, &Address::new(to.clone()))?;
            println!("delegated {} claim(s) to {to}", claims.len());
        }
        Commands::CastVote {
            claims,
            proposal,
            support,
        } => {
            let outcome = pool.cast_vote(&caller, claims, *proposal, *support)?;
            println!(
                "cast {} unit(s) on proposal {proposal}; tally now {}; relayed {} vote(s)",
                outcome.weight, outcome.tally, outcome.relayed
            );
        }
        Commands::Transfer { to, amount } => {
            pool.transfer_units(&caller, &Address::new(to.clone()), *amount)?;
            println!("transferred {amount} unit(s) to {to}");
        }
        Commands::SetProposal { proposal, state } => {
            let state = ProposalState::try_from(*state)
                .map_err(|raw| anyhow::anyhow!("unknown proposal state {raw}"))?;
            pool.governance_mut().set_state(*proposal, state);
            println!("proposal {proposal} set to {state:?}");
        }
        Commands::Prune { proposal } => {
            let pruned = pool.prune_voted(*proposal);
            println!(
                "proposal {proposal}: {}",
                if pruned { "records pruned" } else { "still open, kept" }
            );
        }
        Commands::Pause { off } => {
            pool.set_paused(!*off);
            println!("deposits {}", if *off { "resumed" } else { "paused" });
        }
        Commands::Status { proposal } => {
            println!("paused: {}", pool.paused());
            println!("custody ({}): {:?}", pool.custody_len(), pool.custodied_nouns());
            println!(
                "unit supply: {}; caller balance: {}",
                pool.unit_supply(),
                pool.unit_balance(&caller)
            );
            println!("live claims: {}", pool.live_fragments());
            if let Some(proposal) = proposal {
                for support in [Support::Against, Support::For, Support::Abstain] {
                    println!(
                        "proposal {proposal} {support:?}: {} unit(s)",
                        pool.vote_tally(*proposal, support)
                    );
                }
            }
        }
        Commands::Events => {
            for event in pool.events() {
                println!("{event:?}");
            }
        }
    }
    save_pool(&cli.state, &pool)?;
    Ok(())
}
