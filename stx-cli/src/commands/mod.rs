/// Broadcast an encoded transaction
pub mod broadcast;
/// Call a contract function
pub mod call_contract;
/// Decode an encoded transaction
pub mod decode;
/// Deploy a contract
pub mod deploy_contract;
/// Write the default configuration
pub mod init;
/// Generate or restore a keychain
pub mod make_keychain;
/// Transfer STX
pub mod send_tokens;
/// Complete a sponsored transaction
pub mod sponsor;
/// Helpers shared by the subcommands
pub mod utils;
