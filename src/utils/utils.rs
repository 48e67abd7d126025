use anyhow::Result;

pub fn u8_to_f32_vec(v: &[u8]) -> Vec<f32> {
    v.chunks_exact(4)
        .map(TryInto::try_into)
        .map(Result::unwrap)
        .map(f32::from_le_bytes)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_to_f32_vec() {
        let bytes: Vec<u8> = [1.0f32, -0.5, 0.25]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        assert_eq!(u8_to_f32_vec(&bytes), vec![1.0, -0.5, 0.25]);
    }
}
