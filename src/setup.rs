//! The setup flow: configure a run, choose its network, save.

use crate::backend::Backend;
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::events::OutboundEvent;
use crate::session::{self, SessionData, SessionStore, CONFIG_KEY};

/// How far through setup the user is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStep {
    #[default]
    Configure,
    ChooseNetwork,
    Saved,
}

pub struct SetupFlow {
    step: SetupStep,
    config: SimulationConfig,
    network: Option<String>,
    outbound: Vec<OutboundEvent>,
}

impl Default for SetupFlow {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl SetupFlow {
    pub fn new(config: SimulationConfig) -> Self {
        let network = config.network.clone();
        Self {
            step: SetupStep::Configure,
            config,
            network,
            outbound: vec![],
        }
    }

    /// Starts from whatever configuration was saved before, if any.
    pub fn resume(store: &impl SessionStore) -> Result<Self> {
        match session::PersistedSession::load(store) {
            Ok(saved) => {
                let mut flow = Self::new(saved.config);
                flow.network = saved.data.network.or(flow.network);
                Ok(flow)
            }
            Err(Error::MissingPrerequisite { .. }) => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    /// Replaces the configuration. An invalid configuration is refused and
    /// the previous one kept.
    pub fn configure(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        if let Some(network) = &config.network {
            self.network = Some(network.clone());
        }
        self.config = config;
        self.step = SetupStep::ChooseNetwork;
        Ok(())
    }

    pub fn choose_network(&mut self, network: impl Into<String>) -> Result<()> {
        if self.step < SetupStep::ChooseNetwork {
            return Err(Error::MissingPrerequisite {
                what: "simulation configuration",
            });
        }
        let network = network.into();
        log::debug!("network {} chosen", network);
        self.config.network = Some(network.clone());
        self.network = Some(network);
        self.step = SetupStep::ChooseNetwork;
        Ok(())
    }

    /// Saves the configuration to the backend, then persists it for the
    /// run page. Nothing is persisted if the backend refuses it.
    pub fn save(
        &mut self,
        backend: &mut impl Backend,
        store: &mut impl SessionStore,
    ) -> Result<SessionData> {
        if self.step < SetupStep::ChooseNetwork {
            return Err(Error::MissingPrerequisite {
                what: "simulation configuration",
            });
        }
        let network = self.network.clone().ok_or(Error::MissingPrerequisite {
            what: "road network",
        })?;
        self.config.validate()?;

        let reply = backend.save_config(&self.config).inspect_err(|err| {
            log::warn!("{}", err);
        })?;

        let data = SessionData {
            network: Some(network),
            config_id: reply.config_id,
            last_run: None,
        };
        session::save_config(store, &self.config)?;
        session::save_session_data(store, &data)?;
        log::info!("configuration saved under `{}`", CONFIG_KEY);

        self.outbound.push(OutboundEvent::ConfigSaved {
            config: self.config.clone(),
        });
        self.step = SetupStep::Saved;
        Ok(data)
    }

    /// Takes the events waiting to be emitted to the host.
    pub fn take_outbound(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.outbound)
    }
}
