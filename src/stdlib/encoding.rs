//! Base64 helpers over strings and byte sequences.
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;

use crate::ast::function::{FnError, Function};
use crate::native::NativeFunction;

pub(crate) fn functions() -> Vec<Function> {
    let mut encode = NativeFunction::unary("base64Encode", |s: String| {
        Ok(STANDARD.encode(s.as_bytes()))
    })
    .into_function();
    encode.combine(
        &NativeFunction::unary("base64Encode", |b: Vec<u8>| Ok(STANDARD.encode(&b)))
            .into_function(),
    );

    let mut decode_fn =
        NativeFunction::unary("base64Decode", |s: String| decode(&s)).into_function();
    decode_fn.combine(
        &NativeFunction::unary("base64Decode", |b: Vec<u8>| {
            let s = String::from_utf8(b)
                .map_err(|_| FnError::new("invalid UTF-8 in base64 input"))?;
            decode(&s)
        })
        .into_function(),
    );

    vec![encode, decode_fn]
}

/// Decode padded input, retrying without padding on failure.
fn decode(input: &str) -> Result<Vec<u8>, FnError> {
    match STANDARD.decode(input) {
        Ok(bytes) => Ok(bytes),
        Err(_) => STANDARD_NO_PAD
            .decode(input)
            .map_err(|err| FnError::new(format!("base64 decode failed: {}", err))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::Value;

    fn lookup(name: &str) -> Function {
        functions()
            .into_iter()
            .find(|f| f.name() == name)
            .expect("function not registered")
    }

    #[test]
    fn test_encode_string_and_bytes() {
        let encode = lookup("base64Encode");
        assert_eq!(
            encode.call(&[Value::String("hello".to_string())]).unwrap(),
            Value::String("aGVsbG8=".to_string())
        );
        assert_eq!(
            encode.call(&[Value::Bytes(b"hello".to_vec())]).unwrap(),
            Value::String("aGVsbG8=".to_string())
        );
    }

    #[test]
    fn test_decode_accepts_padded_and_unpadded() {
        let decode = lookup("base64Decode");
        assert_eq!(
            decode.call(&[Value::String("aGVsbG8=".to_string())]).unwrap(),
            Value::Bytes(b"hello".to_vec())
        );
        assert_eq!(
            decode.call(&[Value::String("aGVsbG8".to_string())]).unwrap(),
            Value::Bytes(b"hello".to_vec())
        );
        assert!(decode.call(&[Value::String("!!!".to_string())]).is_err());
    }
}
