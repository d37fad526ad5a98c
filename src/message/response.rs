use super::header::{self, Header, MessageType};
use super::options::{self, write_option};
use super::packet::PackageError;

/// Builds the reply to a request: ACK when the request was Confirmable,
/// NON otherwise, echoing its token and message id. The body is tagged
/// `text/plain` through a Content-Format option.
pub fn encode_response(
    request_type: MessageType,
    token: &[u8],
    message_id: u16,
    code: u8,
    payload: &[u8],
) -> Result<Vec<u8>, PackageError> {
    if token.len() > header::MAX_TOKEN_LENGTH {
        return Err(PackageError::InvalidTokenLength);
    }

    let mut header = Header::new();
    header.set_type(match request_type {
        MessageType::Confirmable => MessageType::Acknowledgement,
        _ => MessageType::NonConfirmable,
    });
    header.set_token_length(token.len() as u8);
    header.code = code;
    header.set_message_id(message_id);

    let mut bytes = Vec::with_capacity(header::HEADER_LEN + token.len() + 2 + 1 + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(token);

    let mut last_option = 0;
    write_option(
        &mut bytes,
        &mut last_option,
        options::CONTENT_FORMAT,
        &[options::TEXT_PLAIN],
    )?;

    if !payload.is_empty() {
        bytes.push(options::PAYLOAD_MARKER);
        bytes.extend_from_slice(payload);
    }
    Ok(bytes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::options::OptionIter;
    use crate::message::packet::decode;

    #[test]
    fn test_ack_with_payload() {
        let bytes = encode_response(
            MessageType::Confirmable,
            &[0xAB, 0xCD],
            9,
            header::CODE_CONTENT,
            b"21.5",
        )
        .unwrap();
        assert_eq!(
            bytes,
            vec![
                0x62, 0x45, 0x00, 0x09, 0xAB, 0xCD, 0xC1, 0x00, 0xFF, b'2', b'1', b'.', b'5',
            ]
        );

        let msg = decode(&bytes).unwrap();
        assert_eq!(msg.get_type(), MessageType::Acknowledgement);
        assert_eq!(msg.get_status(), "2.05");
        assert_eq!(msg.get_token(), &[0xAB, 0xCD]);
        assert_eq!(msg.payload, b"21.5".to_vec());

        let content_format: Vec<_> = OptionIter::new(&bytes[6..]).collect();
        assert_eq!(content_format.len(), 1);
        assert_eq!(content_format[0].unwrap().number, options::CONTENT_FORMAT);
    }

    #[test]
    fn test_non_without_payload() {
        let bytes = encode_response(
            MessageType::NonConfirmable,
            &[],
            1,
            header::CODE_NOT_FOUND,
            b"",
        )
        .unwrap();
        assert_eq!(bytes, vec![0x50, 0x84, 0x00, 0x01, 0xC1, 0x00]);
        assert!(decode(&bytes).unwrap().payload.is_empty());
    }
}
