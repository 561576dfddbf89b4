//! Serial command service task
//!
//! Assembles UART bytes into lines, runs each line through the
//! interpreter and writes the response back. Commands run to completion
//! one at a time; bytes arriving meanwhile wait in the UART ring buffer.

use cortex_m::peripheral::SCB;
use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use blandpanel_protocol::{ExitKind, LineBuffer, Outcome, Response};

use crate::board::BoardInterpreter;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial task - serves the command protocol until `REPL` or `RESET`
#[embassy_executor::task]
pub async fn serial_task(
    mut rx: BufferedUartRx,
    mut tx: BufferedUartTx,
    mut interpreter: BoardInterpreter,
) {
    info!("Serial task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            let outcome = match lines.feed(byte) {
                Ok(Some(line)) => {
                    debug!("Command: {=str}", line);
                    interpreter.handle(line)
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!("Dropped input line: {:?}", e);
                    Outcome::Reply(Response::Fault(e.into()))
                }
            };

            if let Some(response) = outcome.response() {
                if let Response::Fault(e) = &response {
                    warn!("Command failed: {:?}", e);
                }
                send_response(&mut tx, &response).await;
            }

            match outcome {
                Outcome::Exit(ExitKind::Repl) => {
                    flush(&mut tx).await;
                    info!("REPL requested, serial service stopped");
                    return;
                }
                Outcome::Exit(ExitKind::Reset) => {
                    flush(&mut tx).await;
                    info!("Reset requested");
                    SCB::sys_reset();
                }
                _ => {}
            }
        }
    }
}

/// Write one response line
async fn send_response(tx: &mut BufferedUartTx, response: &Response<'_>) {
    match response.encode() {
        Ok(line) => {
            if let Err(e) = tx.write_all(line.as_bytes()).await {
                warn!("Failed to send response: {:?}", e);
            }
        }
        Err(_) => error!("Response does not fit the line buffer: {:?}", response),
    }
}

async fn flush(tx: &mut BufferedUartTx) {
    if let Err(e) = tx.flush().await {
        warn!("UART flush failed: {:?}", e);
    }
}
