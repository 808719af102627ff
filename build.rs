use std::env;

fn main() {
    // Tracking host defaults baked into the image (optional).
    // Empty values leave the registered parameter defaults in place.

    // Host IPv4 address, dotted quad
    if let Ok(ip) = env::var("TRACKER_HOST_IP") {
        println!("cargo:rustc-env=TRACKER_HOST_IP={}", ip);
        println!("cargo:warning=Using TRACKER_HOST_IP from environment: {}", ip);
    } else {
        println!("cargo:rustc-env=TRACKER_HOST_IP=");
    }

    // Host UDP port
    if let Ok(port) = env::var("TRACKER_HOST_PORT") {
        println!("cargo:rustc-env=TRACKER_HOST_PORT={}", port);
        println!(
            "cargo:warning=Using TRACKER_HOST_PORT from environment: {}",
            port
        );
    } else {
        println!("cargo:rustc-env=TRACKER_HOST_PORT=");
    }

    println!("cargo:rerun-if-env-changed=TRACKER_HOST_IP");
    println!("cargo:rerun-if-env-changed=TRACKER_HOST_PORT");
}
