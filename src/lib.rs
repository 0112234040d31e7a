#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::too_long_first_doc_paragraph
)]

//! focas_status
//!
//! focas_status は FANUC CNC に FOCAS ドライバ経由で接続し、運転モードと
//! 運転状態を読み出して表示する Rust ライブラリです。
//!
//! 主な機能:
//! - ドライバ境界 (`FocasDriver`) と、ベンダー `fwlib32` へのバインディング (feature `fwlib`)
//! - ハンドルを所有し、終了時に必ず解放する `Session`
//! - モード/運転状態コードの表 (`codes`)
//! - 戻り値の説明レジストリ (`error_codes`)
//! - テスト用のシミュレーションドライバ (`driver::sim`)
//!
//! 使い方の簡単な例:
//! ```no_run
//! use focas_status::driver::sim::SimulatedDriver;
//! use focas_status::{ConnectionTarget, Session};
//! let target = ConnectionTarget::direct("192.168.0.100", 8193);
//! let mut session = Session::connect(SimulatedDriver::new(), &target)?;
//! println!("Mode is: {}", session.get_mode()?);
//! # Ok::<(), focas_status::FocasError>(())
//! ```

pub mod codes;
pub mod config;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod error_codes;
pub mod report;
pub mod session;

pub use codes::{StatusDisplay, StatusLabel};
pub use config::Config;
pub use driver::{FocasDriver, Handle, StatusSnapshot};
pub use endpoint::ConnectionTarget;
pub use error::FocasError;
pub use report::{Report, ReportFormat};
pub use session::Session;

/// Register the embedded return-code table into the global registry.
///
/// Safe to call more than once; later calls merge the same entries again.
///
/// # Errors
///
/// Returns `Err(FocasError)` when the embedded table cannot be parsed or the
/// registry lock is poisoned.
pub fn init_defaults() -> Result<(), FocasError> {
    error_codes::ErrorRegistry::embedded()?.register_or_merge()
}
