//! 初期管理者用のパスワードハッシュを生成する
//!
//! `cargo run --bin generate-password-hash -- <senha>`

use gym_backend::utils::password::PasswordManager;
use std::env;
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let password = match env::args().nth(1) {
        Some(password) => password,
        None => {
            print!("Senha para o administrador inicial: ");
            io::stdout().flush()?;

            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            password.trim().to_string()
        }
    };

    if password.is_empty() {
        eprintln!("Error: password cannot be empty");
        std::process::exit(1);
    }

    let manager = PasswordManager::from_env()?;
    match manager.hash_password(&password) {
        Ok(hash) => {
            println!("\nAdd to your .env file:");
            println!("INITIAL_ADMIN_PASSWORD_HASH='{}'", hash);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error generating password hash: {}", e);
            std::process::exit(1);
        }
    }
}
