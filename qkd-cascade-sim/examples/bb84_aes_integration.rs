use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;

use qkd_cascade_sim::simulation::{run, SimulationConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run(&SimulationConfig::new(2000, 0.03))?;
    println!(
        "Established key with error rate {:.2}% and {} residual errors",
        outcome.error_rate * 100.0,
        outcome.remaining_errors
    );

    // The 256-bit secret is used directly as the AES-256-GCM key.
    let aes_key = Key::<Aes256Gcm>::from_slice(outcome.final_secret.as_bytes());
    let cipher = Aes256Gcm::new(aes_key);

    let mut nonce = [0u8; 12];
    OsRng.fill_bytes(&mut nonce);
    let nonce = Nonce::from_slice(&nonce);

    let message = b"Your secret message";
    let encrypted_message = cipher
        .encrypt(nonce, message.as_ref())
        .map_err(|e| format!("encryption failure: {}", e))?;
    let decrypted_message = cipher
        .decrypt(nonce, encrypted_message.as_ref())
        .map_err(|e| format!("decryption failure: {}", e))?;

    assert_eq!(message, &decrypted_message[..]);
    println!("Success! The message was correctly encrypted and decrypted using the distilled key.");
    Ok(())
}
