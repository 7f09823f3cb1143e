/*!
# Springbeat DevKit - test doubles for the agent

Test support for code talking to actuators and brokers:
- Mock MQTT client recording every publish
- Stub actuator HTTP server with scripted answers
- Sample `/metrics`, `/health` and `/info` bodies
- Harness with JSON assertions on published events
*/

pub mod actuator_stub;
pub mod fixtures;
pub mod mqtt_stub;
pub mod test_utils;

pub use actuator_stub::StubActuator;
pub use mqtt_stub::MockMqttClient;
pub use test_utils::TestHarness;
