use a2p_keygen::*;

pub fn main() {
    // The firmware derives its id from the chip's eFuse MAC.
    let device = DeviceId::from_efuse_mac(0x1234_ABCD_5678);

    // Use the exact same secret and XOR constant that issued the keys.
    let verifier = Verifier::default();

    println!("Device ID: {}", device);
    for code in ["8b99-51b8-2928-936b", "BABC-04D9-180D-C60A", "not-a-key"] {
        match verifier.verify(&device, code) {
            Status::Valid => println!("{}: key is valid!", code),
            Status::Invalid => println!("{}: key is invalid!", code),
            Status::Malformed => println!("{}: key is malformed!", code),
        }
    }
}
