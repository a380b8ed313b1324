/*!
A library for generating and verifying Analyse2Print license keys
without requiring an Internet connection.

The generator and the device firmware share two compiled-in constants,
a secret string and a 32-bit XOR mask. Both sides hash the device id
together with the secret, so a key can be checked on the device itself.

# Features

* Does not require an Internet connection.
* Deterministic: the same device id always yields the same key.
* Case-insensitive device ids and activation codes.

Note that the hash is a fast mixing function (DJB2) and not a MAC.
It obfuscates the key schedule, it does not make forging impossible.

# Anatomy of a license key

Every license key consists of two 32-bit parts. The first part is the
DJB2 hash of the device id followed directly by the shared secret.
The second part is the first part XOR'ed with the XOR constant.

```text
┌─────────┬─────────┬─────────┬─────────┐
│  HHHH   │  LLLL   │  hhhh   │  llll   │
├─────────┴─────────┼─────────┴─────────┤
│ PART 1            │ PART 2            │
│ hash(id + secret) │ part 1 ^ XOR      │
└───────────────────┴───────────────────┘
```

# Generating a license key

```rust
use a2p_keygen::*;

// Normalize the device id exactly like the firmware does.
let device = DeviceId::parse("1234abcd5678").unwrap();

// Create a generator using the compiled-in secret and XOR constant.
let generator = Generator::default();
let key = generator.generate(&device);

assert_eq!("8B99-51B8-2928-936B", key.serialize::<DashedHexFormat>());
```

# Verifying an activation code

```rust
use a2p_keygen::*;

let device = DeviceId::from_efuse_mac(0x1234_ABCD_5678);
let verifier = Verifier::default();

match verifier.verify(&device, "8b99-51b8 2928-936b") {
    Status::Valid => println!("Key is valid!"),
    Status::Invalid => println!("Key is invalid!"),
    Status::Malformed => println!("Key is malformed!"),
}
```
*/

mod device;
mod error;

pub use device::{DeviceId, MIN_DEVICE_ID_LENGTH};
pub use error::{KeygenError, Result};

use std::fmt;

/// The secret appended to every device id before hashing.
/// Must match the value baked into the firmware.
pub const SHARED_SECRET: &str = "A2P_SECRET_2024_CHANGE_ME";

/// The mask used to derive the second half of a key.
/// Must match the value baked into the firmware.
pub const XOR_CONSTANT: u32 = 0xA2B1_C2D3;

const PART_BYTE_LENGTH: usize = 4;

/// Number of raw bytes in a license key.
pub const KEY_BYTE_LENGTH: usize = PART_BYTE_LENGTH * 2;

const KEY_HEX_LENGTH: usize = KEY_BYTE_LENGTH * 2;
const GROUP_HEX_LENGTH: usize = 4;
const MIN_ACTIVATION_CODE_LENGTH: usize = 10;

/// Represent a hasher that turns the device id and secret into
/// the first part of a license key.
pub trait KeyHasher {
    fn hash(&self, input: &[u8]) -> u32;
}

/// The DJB2 hash with 32-bit wraparound, as implemented by the firmware.
#[derive(Debug, Default, Clone, Copy)]
pub struct Djb2;

impl KeyHasher for Djb2 {
    fn hash(&self, input: &[u8]) -> u32 {
        input.iter().fold(5381_u32, |hash, byte| {
            (hash << 5).wrapping_add(hash).wrapping_add(u32::from(*byte))
        })
    }
}

/// Represents a license key serializer.
pub trait Serializer {
    /// Serializes a license key to a string.
    fn serialize(key: &LicenseKey) -> String;

    /// Deserializes a string into the raw key bytes.
    fn deserialize(input: &str) -> Result<[u8; KEY_BYTE_LENGTH]>;
}

/// License key serializer for contiguous hex strings,
/// the form the firmware stores after activation.
pub struct HexFormat {}
impl Serializer for HexFormat {
    fn serialize(key: &LicenseKey) -> String {
        hex::encode_upper(key.get_bytes())
    }

    fn deserialize(input: &str) -> Result<[u8; KEY_BYTE_LENGTH]> {
        let mut bytes = [0_u8; KEY_BYTE_LENGTH];
        hex::decode_to_slice(input, &mut bytes)
            .map_err(|err| KeygenError::InvalidKeyFormat(format!("{input:?}: {err}")))?;
        Ok(bytes)
    }
}

/// License key serializer for the `XXXX-XXXX-XXXX-XXXX` form
/// that is handed out to users.
pub struct DashedHexFormat {}
impl Serializer for DashedHexFormat {
    fn serialize(key: &LicenseKey) -> String {
        let hex = HexFormat::serialize(key);
        let mut output = String::with_capacity(KEY_HEX_LENGTH + 3);
        for (index, digit) in hex.chars().enumerate() {
            if index > 0 && index % GROUP_HEX_LENGTH == 0 {
                output.push('-');
            }
            output.push(digit);
        }
        output
    }

    fn deserialize(input: &str) -> Result<[u8; KEY_BYTE_LENGTH]> {
        let groups: Vec<&str> = input.split('-').collect();
        if groups.len() != KEY_HEX_LENGTH / GROUP_HEX_LENGTH
            || groups.iter().any(|group| group.len() != GROUP_HEX_LENGTH)
        {
            return Err(KeygenError::InvalidKeyFormat(format!(
                "{input:?}: expected XXXX-XXXX-XXXX-XXXX"
            )));
        }
        HexFormat::deserialize(&groups.concat())
    }
}

/// Represents a generated or parsed license key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LicenseKey {
    bytes: [u8; KEY_BYTE_LENGTH],
}

impl LicenseKey {
    pub(crate) fn new(bytes: [u8; KEY_BYTE_LENGTH]) -> Self {
        Self { bytes }
    }

    pub(crate) fn from_parts(part1: u32, part2: u32) -> Self {
        let mut bytes = [0_u8; KEY_BYTE_LENGTH];
        bytes[..PART_BYTE_LENGTH].copy_from_slice(&part1.to_be_bytes());
        bytes[PART_BYTE_LENGTH..].copy_from_slice(&part2.to_be_bytes());
        Self::new(bytes)
    }

    /// Deserializes a [`&str`] into a license key by using the
    /// provided [`Serializer`].
    pub fn parse<T: Serializer>(input: &str) -> Result<LicenseKey> {
        T::deserialize(input).map(LicenseKey::new)
    }

    /// Serializes the license key into a [`String`] by using the
    /// provided [`Serializer`].
    pub fn serialize<T: Serializer>(&self) -> String {
        T::serialize(self)
    }

    /// Gets the individual bytes that makes up the license key.
    pub fn get_bytes(&self) -> [u8; KEY_BYTE_LENGTH] {
        self.bytes
    }

    /// The hash of the device id and secret.
    pub fn part1(&self) -> u32 {
        let mut part = [0_u8; PART_BYTE_LENGTH];
        part.copy_from_slice(&self.bytes[..PART_BYTE_LENGTH]);
        u32::from_be_bytes(part)
    }

    /// The first part XOR'ed with the XOR constant.
    pub fn part2(&self) -> u32 {
        let mut part = [0_u8; PART_BYTE_LENGTH];
        part.copy_from_slice(&self.bytes[PART_BYTE_LENGTH..]);
        u32::from_be_bytes(part)
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize::<DashedHexFormat>())
    }
}

/// The license key generator.
#[derive(Debug, Clone)]
pub struct Generator<T: KeyHasher> {
    hasher: T,
    secret: String,
    xor: u32,
}

impl<T: KeyHasher> Generator<T> {
    /// Creates a new license key generator.
    pub fn new(hasher: T, secret: impl Into<String>, xor: u32) -> Self {
        Self {
            hasher,
            secret: secret.into(),
            xor,
        }
    }

    /// Creates the license key for the specified device.
    pub fn generate(&self, device: &DeviceId) -> LicenseKey {
        let mut input = String::with_capacity(device.as_str().len() + self.secret.len());
        input.push_str(device.as_str());
        input.push_str(&self.secret);

        let part1 = self.hasher.hash(input.as_bytes());
        let part2 = part1 ^ self.xor;

        tracing::debug!(device = %device, part1, part2, "derived license key");
        LicenseKey::from_parts(part1, part2)
    }
}

impl Default for Generator<Djb2> {
    fn default() -> Self {
        Self::new(Djb2, SHARED_SECRET, XOR_CONSTANT)
    }
}

/// Normalizes a raw device id and derives its key with the
/// compiled-in constants.
pub fn derive(raw_device_id: &str) -> Result<LicenseKey> {
    let device = DeviceId::parse(raw_device_id)?;
    Ok(Generator::default().generate(&device))
}

/// Representation of an activation code status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The code matches the device.
    Valid,
    /// The code is well formed but belongs to another device or secret.
    Invalid,
    /// The code is not a license key at all.
    Malformed,
}

/// The activation code verifier, as run by the firmware.
#[derive(Debug, Clone)]
pub struct Verifier<T: KeyHasher> {
    generator: Generator<T>,
}

impl<T: KeyHasher> Verifier<T> {
    /// Creates a new verifier. The generator must be configured with
    /// the same secret and XOR constant that issued the keys.
    pub fn new(generator: Generator<T>) -> Self {
        Self { generator }
    }

    /// Checks an activation code as typed by the user.
    ///
    /// Dashes and spaces are ignored, letters are compared without
    /// regard to case and only the first 16 hex digits are considered.
    pub fn verify(&self, device: &DeviceId, code: &str) -> Status {
        if code.chars().count() < MIN_ACTIVATION_CODE_LENGTH {
            tracing::warn!(device = %device, "activation code too short");
            return Status::Malformed;
        }

        let cleaned: String = code
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .take(KEY_HEX_LENGTH)
            .collect();

        let key = match LicenseKey::parse::<HexFormat>(&cleaned) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(device = %device, error = %err, "activation code malformed");
                return Status::Malformed;
            }
        };

        if key == self.generator.generate(device) {
            tracing::info!(device = %device, "activation successful");
            Status::Valid
        } else {
            tracing::warn!(device = %device, key = %key, "key validation failed");
            Status::Invalid
        }
    }
}

impl Default for Verifier<Djb2> {
    fn default() -> Self {
        Self::new(Generator::default())
    }
}
