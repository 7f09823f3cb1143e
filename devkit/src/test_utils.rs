/*!
Test harness for beat tests

Bundles a stub actuator and a mock MQTT client, and asserts on the JSON
events published per topic. Field paths are dot separated; numeric segments
index into arrays (`diagnostics.0.kind`).
*/

use crate::actuator_stub::StubActuator;
use crate::mqtt_stub::MockMqttClient;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

pub struct TestHarness {
    pub mqtt_client: MockMqttClient,
    pub actuator: StubActuator,
}

impl TestHarness {
    /// Start a stub actuator with no scripted paths
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok();

        Ok(Self {
            mqtt_client: MockMqttClient::new(),
            actuator: StubActuator::start().await?,
        })
    }

    fn last_event(&self, topic: &str) -> Result<Value> {
        self.mqtt_client
            .get_last_json_message::<Value>(topic)?
            .ok_or_else(|| anyhow::anyhow!("No message published on {}", topic))
    }

    /// Assert a field of the latest event on `topic` equals `expected`
    pub fn assert_field_equals(&self, topic: &str, field_path: &str, expected: &Value) -> Result<()> {
        let event = self.last_event(topic)?;
        match get_nested_field(&event, field_path) {
            Some(actual) if actual == expected => {
                log::info!("Field '{}' = {} in {}", field_path, expected, topic);
                Ok(())
            }
            Some(actual) => anyhow::bail!(
                "Field '{}' mismatch in {}: expected {}, got {}",
                field_path,
                topic,
                expected,
                actual
            ),
            None => anyhow::bail!("Field '{}' not found in latest message on {}", field_path, topic),
        }
    }

    /// Assert a field is absent from the latest event on `topic`
    pub fn assert_field_missing(&self, topic: &str, field_path: &str) -> Result<()> {
        let event = self.last_event(topic)?;
        if let Some(actual) = get_nested_field(&event, field_path) {
            anyhow::bail!("Field '{}' unexpectedly present in {}: {}", field_path, topic, actual);
        }
        Ok(())
    }

    /// Stats on the messages published so far
    pub fn get_stats(&self) -> TestStats {
        let messages = self.mqtt_client.get_published_messages();
        let mut topic_counts = HashMap::new();

        for msg in &messages {
            *topic_counts.entry(msg.topic.clone()).or_insert(0) += 1;
        }

        TestStats {
            total_messages: messages.len(),
            topic_counts,
        }
    }
}

#[derive(Debug)]
pub struct TestStats {
    pub total_messages: usize,
    pub topic_counts: HashMap<String, usize>,
}

fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
