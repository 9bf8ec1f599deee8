//! GPIO / peripheral pin assignments for the ERV controller board.
//!
//! Single source of truth for pin numbers. The RS-485 transceiver is an
//! auto-direction module, so no DE/RE pin is needed.

// ---------------------------------------------------------------------------
// RS-485 transceiver (UART1)
// ---------------------------------------------------------------------------

/// UART TX → transceiver DI.
pub const ERV_UART_TX_GPIO: i32 = 9;
/// UART RX ← transceiver RO.
pub const ERV_UART_RX_GPIO: i32 = 8;
