//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                  | Connects to                 |
//! |-------------|-----------------------------|-----------------------------|
//! | `hardware`  | SensorPort, OutputPort,     | ESP32 ADC, GPIO             |
//! |             | DelayNs                     |                             |
//! | `channels`  | (bounded line queue)        | serial reader → control loop|
//! | `eeprom`    | ByteStore                   | NVS / in-memory / file      |
//! | `log_sink`  | EventSink                   | Log output                  |
//! | `serial`    | EventSink                   | JSON lines on the UART      |
//! | `time`      | Clock                       | ESP32 system timer          |

pub mod channels;
pub mod eeprom;
pub mod hardware;
pub mod log_sink;
pub mod serial;
pub mod time;
