use common::{GravityFilter, IMUSample, Sample3D, XYZ};

use broadcast_rs::{BroadcastController, BroadcastError, ConnectionStatus};

use crate::display::{
    format_value, CONNECTION_STATUS_PREFIX, HOST_IP_PREFIX, PUBLISH_RATE_PREFIX,
};
use crate::prompt::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Accelerometer screen: shows linear acceleration and drives the publisher through
/// its [`BroadcastController`].
pub struct MotionScreen {
    controller: BroadcastController,
    filter: GravityFilter,
    linear: XYZ,
    connection_status: ConnectionStatus,
    publish_rate_millis: u64,
    prompt_open: bool,
}

impl MotionScreen {
    pub fn new(controller: BroadcastController) -> Self {
        let mut screen = Self {
            controller,
            filter: GravityFilter::new(),
            linear: XYZ::default(),
            connection_status: ConnectionStatus::default(),
            publish_rate_millis: 0,
            prompt_open: false,
        };
        screen.refresh_service_state();
        screen
    }

    /// Attaches to the publisher. Returns true if the address prompt was opened.
    pub fn start(&mut self) -> bool {
        self.prompt_open = self.controller.attach();
        self.refresh_service_state();
        self.prompt_open
    }

    pub fn prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Refreshes the service state and filters the new sample. Returns the displayed
    /// linear acceleration.
    pub fn on_sensor_changed(&mut self, sample: &Sample3D) -> &XYZ {
        self.refresh_service_state();
        self.linear = self.filter.update(&sample.get_measurement());
        &self.linear
    }

    pub async fn handle(&mut self, command: Command) -> Result<Flow, BroadcastError> {
        match command {
            Command::OpenPrompt => {
                self.prompt_open = true;
            }
            Command::ConfirmAddress(address) => {
                self.prompt_open = false;
                self.controller.confirm_address(&address).await?;
            }
            Command::CancelAddress => {
                if self.prompt_open {
                    self.prompt_open = false;
                    self.controller.cancel_address();
                }
            }
            Command::Rate(index) => {
                self.controller.change_rate(index).await?;
            }
            Command::Status | Command::Help => {}
            Command::Quit => return Ok(Flow::Quit),
        }
        self.refresh_service_state();
        Ok(Flow::Continue)
    }

    pub fn linear(&self) -> &XYZ {
        &self.linear
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection_status
    }

    pub fn publish_rate_millis(&self) -> u64 {
        self.publish_rate_millis
    }

    pub fn controller(&self) -> &BroadcastController {
        &self.controller
    }

    /// Lines of the screen, top to bottom
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "{HOST_IP_PREFIX}{}",
                self.controller.broker_address().unwrap_or_default()
            ),
            format!("{PUBLISH_RATE_PREFIX}{}", self.publish_rate_millis),
            format!("{CONNECTION_STATUS_PREFIX}{}", self.connection_status),
            format!("X: {}", format_value(self.linear.x())),
            format!("Y: {}", format_value(self.linear.y())),
            format!("Z: {}", format_value(self.linear.z())),
        ]
    }

    /// One-line summary refreshed with every sample
    pub fn status_line(&self) -> String {
        format!(
            "x {}  y {}  z {}  | {} | {} ms",
            format_value(self.linear.x()),
            format_value(self.linear.y()),
            format_value(self.linear.z()),
            self.connection_status,
            self.publish_rate_millis
        )
    }

    /// Drops any pending restart and stops the publisher
    pub async fn shutdown(&mut self) -> Result<(), BroadcastError> {
        self.controller.shutdown().await
    }

    fn refresh_service_state(&mut self) {
        let port = self.controller.port();
        let status = port.status();
        if status != self.connection_status {
            log::debug!("{CONNECTION_STATUS_PREFIX}{status}");
            self.connection_status = status;
        }
        self.publish_rate_millis = port.publish_rate_millis();
    }
}
