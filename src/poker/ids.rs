use rand::Rng;
use uuid::Uuid;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ROOM_CODE_LEN: usize = 6;

/// Produces opaque identifiers that are unique for a room's lifetime
pub trait IdGenerator: Send + Sync {
    fn room_id(&self) -> String;
    fn participant_id(&self) -> String;
    fn story_id(&self) -> String;
    fn message_id(&self) -> String;
}

/// UUID v4 based identifiers with a short kind prefix
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self
    }

    fn short_uuid() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl Default for UuidIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidIdGenerator {
    fn room_id(&self) -> String {
        format!("room_{}", Self::short_uuid())
    }

    fn participant_id(&self) -> String {
        Self::short_uuid()
    }

    fn story_id(&self) -> String {
        format!("story_{}", Self::short_uuid())
    }

    fn message_id(&self) -> String {
        format!("msg_{}", Self::short_uuid())
    }
}

/// Trait for generating room codes
pub trait RoomCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Six random characters from the uppercase alphanumeric alphabet
pub struct RandomRoomCodeGenerator;

impl RandomRoomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomRoomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomCodeGenerator for RandomRoomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::models::is_valid_room_code;

    #[test]
    fn test_room_codes_are_six_uppercase_alphanumerics() {
        let generator = RandomRoomCodeGenerator::new();
        for _ in 0..50 {
            let code = generator.generate();
            assert!(is_valid_room_code(&code), "bad code {}", code);
        }
    }

    #[test]
    fn test_ids_carry_kind_prefix_and_are_unique() {
        let ids = UuidIdGenerator::new();
        let a = ids.story_id();
        let b = ids.story_id();

        assert!(a.starts_with("story_"));
        assert!(ids.message_id().starts_with("msg_"));
        assert!(ids.room_id().starts_with("room_"));
        assert!(!ids.participant_id().is_empty());
        assert_ne!(a, b);
    }
}
