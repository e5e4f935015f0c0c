/// One poll cycle: enumerate hubs, fetch their status and decode every sub-device
use futures_util::stream::{self, StreamExt, TryStreamExt};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

use crate::cloud::ApiClient;
use crate::decoding::{DecoderRegistry, Reading};
use crate::error::PollError;
use crate::models::{Hub, HubStatus, PollResult, SensorKey, SensorRecord, SubDeviceDescriptor};

const MAX_CONCURRENT_STATUS_REQUESTS: usize = 4;
const DEFAULT_HUB_NAME: &str = "Hub";

pub struct Poller {
    client: ApiClient,
    registry: DecoderRegistry,
    home_ids: Vec<i64>,
}

impl Poller {
    pub fn new(client: ApiClient, registry: DecoderRegistry, home_ids: Vec<i64>) -> Self {
        Self {
            client,
            registry,
            home_ids,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Run a full cycle. Only authentication and API failures abort it;
    /// undecodable payloads become records without a reading.
    pub async fn poll(&self) -> Result<PollResult, PollError> {
        let home_ids = self.resolve_home_ids().await?;

        let mut hubs = Vec::new();
        for home_id in home_ids {
            let devices = self.client.list_devices(home_id).await?;
            debug!("Home {} has {} hub(s)", home_id, devices.len());
            hubs.extend(
                devices
                    .into_iter()
                    .map(|descriptor| Hub { home_id, descriptor }),
            );
        }

        let mids = hubs.iter().map(|hub| hub.descriptor.mid);
        let status: HashMap<i64, HubStatus> = stream::iter(mids)
            .map(|mid| async move {
                let status = self.client.get_status(mid).await?;
                debug!(
                    "Fetched status for mid={}: {} entries",
                    mid,
                    status.sub_device_status.len()
                );
                Ok::<_, PollError>((mid, status))
            })
            .buffer_unordered(MAX_CONCURRENT_STATUS_REQUESTS)
            .try_collect()
            .await?;

        let mut sensors = BTreeMap::new();
        for hub in &hubs {
            if let Some(hub_status) = status.get(&hub.descriptor.mid) {
                for record in decode_hub(hub, hub_status, &self.registry) {
                    sensors.insert(record.key, record);
                }
            }
        }

        Ok(PollResult {
            hubs,
            status,
            sensors,
        })
    }

    /// Configured home ids, or every home on the account when none are set.
    /// Discovery runs on each cycle so a failure is retried on the next tick.
    pub async fn resolve_home_ids(&self) -> Result<Vec<i64>, PollError> {
        if !self.home_ids.is_empty() {
            return Ok(self.home_ids.clone());
        }

        let homes = self.client.list_homes().await?;
        for home in &homes {
            debug!(
                "Found home {} ({})",
                home.hid,
                home.name.as_deref().unwrap_or("unnamed")
            );
        }
        if homes.is_empty() {
            warn!("No homes found on the account");
        }

        Ok(homes.into_iter().map(|home| home.hid).collect())
    }
}

/// Build a record for every `D<addr>` status entry of a known sub-device
pub fn decode_hub(hub: &Hub, status: &HubStatus, registry: &DecoderRegistry) -> Vec<SensorRecord> {
    let mid = hub.descriptor.mid;
    let by_address: HashMap<i64, &SubDeviceDescriptor> = hub
        .descriptor
        .sub_devices
        .iter()
        .map(|sub| (sub.addr, sub))
        .collect();

    let mut records = Vec::new();
    for entry in &status.sub_device_status {
        let Some(address) = entry.address() else {
            continue;
        };
        let Some(sub) = by_address.get(&address) else {
            debug!("Status for unknown sub-device mid={} addr={}", mid, address);
            continue;
        };

        let decoded = match entry.raw_value() {
            Some(raw) => decode_payload(registry, sub.model.as_deref(), raw, mid, address),
            None => {
                debug!("No raw value for mid={} addr={} (offline)", mid, address);
                None
            }
        };

        records.push(SensorRecord {
            key: SensorKey {
                home_id: hub.home_id,
                hub_id: mid,
                address,
            },
            hub_name: hub
                .descriptor
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_HUB_NAME.to_string()),
            sub_device_name: sub.name.clone(),
            model: sub.model.clone(),
            last_raw_status: entry.clone(),
            decoded,
        });
    }

    records
}

fn decode_payload(
    registry: &DecoderRegistry,
    model: Option<&str>,
    raw: &str,
    mid: i64,
    address: i64,
) -> Option<Reading> {
    let model = model?;
    debug!(
        "Decoding payload for model={} mid={} addr={}: {}",
        model, mid, address, raw
    );

    match registry.decode(model, raw) {
        Some(Ok(reading)) => {
            debug!("Decoded data for mid={} addr={}: {:?}", mid, address, reading);
            Some(reading)
        }
        Some(Err(e)) => {
            warn!(
                "Failed to decode payload for {} mid={} addr={}: {}",
                model, mid, address, e
            );
            None
        }
        None => {
            debug!("No decoder registered for model {}", model);
            None
        }
    }
}
