//! The mutation loop.

use crate::error::EngineError;
use crate::state::{StepOutcome, TableState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use southwind_core::{ConfigError, DeletePolicy, OutputFormat, Schema, SimulationConfig, Table};
use southwind_export::Exporter;
use southwind_generator::{assemble, select_action};
use southwind_store::{execute_statement, Store};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Run-time knobs taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub delete_policy: DeletePolicy,
    pub inter_action_delay: Duration,
    pub output_format: OutputFormat,
    pub seed: Option<u64>,
}

impl EngineSettings {
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let inter_action_delay = Duration::try_from_secs_f64(config.inter_action_delay)
            .map_err(|e| {
                ConfigError::InvalidSetting(format!(
                    "inter_action_delay {}: {e}",
                    config.inter_action_delay
                ))
            })?;
        Ok(Self {
            delete_policy: config.delete_policy,
            inter_action_delay,
            output_format: config.output.format,
            seed: config.seed,
        })
    }
}

/// Drives every table through select → assemble → execute → detect → export.
///
/// Tables are processed in configuration order, one at a time, with the
/// inter-action delay after each.
pub struct MutationEngine<S: Store, E: Exporter> {
    schema: Schema,
    settings: EngineSettings,
    store: S,
    exporter: E,
    rng: StdRng,
    states: HashMap<String, TableState>,
    cycle: u64,
}

impl<S: Store, E: Exporter> MutationEngine<S, E> {
    /// Create an engine from a loaded configuration.
    pub fn from_config(config: &SimulationConfig, store: S, exporter: E) -> Result<Self, EngineError> {
        let settings = EngineSettings::from_config(config)?;
        Ok(Self::new(config.schema.clone(), settings, store, exporter))
    }

    pub fn new(schema: Schema, settings: EngineSettings, store: S, exporter: E) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let states = schema
            .table_names()
            .into_iter()
            .map(|name| (name.to_string(), TableState::Bootstrapping))
            .collect();
        Self {
            schema,
            settings,
            store,
            exporter,
            rng,
            states,
            cycle: 0,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn state(&self, table: &str) -> Option<&TableState> {
        self.states.get(table)
    }

    /// Prepare the exporter and bootstrap every table.
    ///
    /// A table whose bootstrap fails stays `Bootstrapping` and is retried on
    /// its next step.
    pub fn bootstrap(&mut self) -> Result<(), EngineError> {
        let names = self.schema.table_names();
        self.exporter.prepare(&names)?;

        for table in self.schema.tables() {
            let state = self.current_state(&table.name);
            if state != TableState::Bootstrapping {
                continue;
            }
            match bootstrap_table(&mut self.store, table) {
                Ok(next) => {
                    self.states.insert(table.name.clone(), next);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("Bootstrapping table '{}' failed: {e}", table.name),
            }
        }
        Ok(())
    }

    /// Advance one table by one step.
    ///
    /// `state` is the table's current state; the returned outcome carries
    /// the state to record. On error nothing should be recorded.
    pub fn step(&mut self, table: &str, state: TableState) -> Result<StepOutcome, EngineError> {
        let table = self.schema.get_table(table).ok_or_else(|| {
            EngineError::Config(ConfigError::TableNotFound {
                table: table.to_string(),
                context: "mutation engine".to_string(),
            })
        })?;

        let last_token = match state {
            TableState::Bootstrapping => {
                return Ok(StepOutcome {
                    state: bootstrap_table(&mut self.store, table)?,
                    action: None,
                    exported: 0,
                });
            }
            TableState::Steady { last_token } => last_token,
        };

        let mut action_name = None;
        if let Some(action) = select_action(&table.actions, &mut self.rng) {
            let statement = assemble(table, action, &mut self.rng, self.cycle)?;
            debug!(
                "Table '{}' action '{}' ({}): {}",
                table.name,
                action.name(),
                action.kind(),
                statement
            );
            let sql = execute_statement(&mut self.store, &statement)?;
            debug!("Executed: {}", sql);
            action_name = Some(action.name().to_string());
        }

        let max_token = self.store.max_change_token(&table.name)?;
        let mut exported = 0;
        if max_token != last_token {
            let rows = self.store.latest_rows(&table.name)?;
            if !rows.is_empty() {
                self.exporter
                    .export(&table.name, &rows, self.settings.output_format)?;
                exported = rows.len();
            }
            debug!(
                "Table '{}' change token {:?} -> {:?}",
                table.name, last_token, max_token
            );
        }

        Ok(StepOutcome {
            state: TableState::Steady {
                last_token: max_token,
            },
            action: action_name,
            exported,
        })
    }

    /// Run one pass over every table.
    ///
    /// Store and export failures are logged and the table is skipped; fatal
    /// errors end the run.
    pub async fn run_cycle(&mut self) -> Result<(), EngineError> {
        let names: Vec<String> = self
            .schema
            .table_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        for name in names {
            let state = self.current_state(&name);
            match self.step(&name, state) {
                Ok(outcome) => {
                    if let Some(action) = &outcome.action {
                        debug!(
                            "Table '{}' ran '{}', exported {} row(s)",
                            name, action, outcome.exported
                        );
                    }
                    self.states.insert(name.clone(), outcome.state);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("Step for table '{}' failed: {e}", name),
            }

            if self.settings.delete_policy == DeletePolicy::Hard {
                self.purge_all();
            }

            if !self.settings.inter_action_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_action_delay).await;
            }
        }

        self.cycle += 1;
        Ok(())
    }

    /// Run `cycles` cycles.
    pub async fn run_cycles(&mut self, cycles: u64) -> Result<(), EngineError> {
        self.bootstrap()?;
        for _ in 0..cycles {
            self.run_cycle().await?;
        }
        info!("Completed {} cycle(s)", self.cycle);
        Ok(())
    }

    /// Run until a fatal error.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        self.bootstrap()?;
        info!(
            "Mutating {} table(s) with {:?} between actions",
            self.schema.tables().len(),
            self.settings.inter_action_delay
        );
        loop {
            self.run_cycle().await?;
            if self.cycle % 100 == 0 {
                info!("Completed {} cycles", self.cycle);
            }
        }
    }

    fn current_state(&self, table: &str) -> TableState {
        self.states
            .get(table)
            .copied()
            .unwrap_or(TableState::Bootstrapping)
    }

    /// Remove soft-deleted rows from every table.
    ///
    /// A purge can remove the row holding a table's newest token; when that
    /// drops the maximum below the recorded token, the recorded token is
    /// lowered to match so a reissued token is still seen as a change.
    fn purge_all(&mut self) {
        for table in self.schema.tables() {
            if let Err(e) = self.store.purge_soft_deleted(&table.name) {
                error!("Purging table '{}' failed: {e}", table.name);
                continue;
            }

            let Some(TableState::Steady {
                last_token: Some(recorded),
            }) = self.states.get(&table.name).copied()
            else {
                continue;
            };
            match self.store.max_change_token(&table.name) {
                Ok(current) if current.is_none_or(|token| token < recorded) => {
                    debug!(
                        "Table '{}' change token lowered by purge: {} -> {:?}",
                        table.name, recorded, current
                    );
                    self.states.insert(
                        table.name.clone(),
                        TableState::Steady {
                            last_token: current,
                        },
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Reading change token of '{}' failed: {e}", table.name),
            }
        }
        info!("Purged soft-deleted rows");
    }
}

/// Create the table when absent and record its current newest token.
fn bootstrap_table<S: Store>(store: &mut S, table: &Table) -> Result<TableState, EngineError> {
    if !store.table_exists(&table.name)? {
        store.create_table(table)?;
    }
    let last_token = store.max_change_token(&table.name)?;
    info!(
        "Table '{}' ready, newest change token {:?}",
        table.name, last_token
    );
    Ok(TableState::Steady { last_token })
}
