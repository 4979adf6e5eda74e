//! Narrow client/server façades over a `BoxContext` that pin down the
//! four-message choreography: client publishes an ephemeral key out of
//! band, server answers with a `syn` box, client answers with an `ack`
//! box, server decodes it.

use log::trace;

use crate::ciphersuite::{Ciphersuite, Keypair, PublicKey};
use crate::context::BoxContext;
use crate::error::Result;
use crate::secret::Secret;

const SYN_KDF_ID: i8 = 1;
const ACK_KDF_ID: i8 = 2;

/// The responder side: learns the client's ephemeral key, sends `syn`,
/// receives `ack`.
pub struct ServerHandshake<C: Ciphersuite> {
    ctx: BoxContext<C>,
}

impl<C: Ciphersuite> ServerHandshake<C> {
    pub fn new(server_long_term_key: Keypair) -> Self {
        ServerHandshake { ctx: BoxContext::new(Some(server_long_term_key), 1) }
    }

    /// Records the client's out-of-band ephemeral public key.
    pub fn eph(&mut self, client_eph: PublicKey) {
        trace!("ServerHandshake::eph");
        self.ctx.init(client_eph);
    }

    /// Sends the server's static key and greeting, encrypted under
    /// `kdf_id = 1`.
    pub fn syn(&mut self, data: &[u8], pad_len: u32) -> Result<Vec<u8>> {
        trace!("ServerHandshake::syn kdf_id={}", SYN_KDF_ID);
        self.ctx.shut(data, SYN_KDF_ID, pad_len)
    }

    /// Decodes the client's reply, learning the client's static key.
    pub fn ack(&mut self, ack: &[u8]) -> Result<Vec<u8>> {
        trace!("ServerHandshake::ack kdf_id={}", ACK_KDF_ID);
        self.ctx.open(ack, ACK_KDF_ID)
    }

    /// The client's static public key, available once `ack` succeeds.
    pub fn peer_public_key(&self) -> [u8; 32] {
        self.ctx.peer_public_key()
    }

    /// The evolved chain variable, for deriving post-handshake transport
    /// keys via `Ciphersuite::derive_cc_cc`.
    pub fn chain_variable(&self) -> &Secret {
        self.ctx.chain_variable()
    }
}

/// The initiator side: publishes an ephemeral key, receives `syn`, sends
/// `ack`.
pub struct ClientHandshake<C: Ciphersuite> {
    ctx: BoxContext<C>,
}

impl<C: Ciphersuite> ClientHandshake<C> {
    pub fn new(client_long_term_key: Keypair) -> Self {
        ClientHandshake { ctx: BoxContext::new(Some(client_long_term_key), 1) }
    }

    /// The client's ephemeral public key, to be sent out of band.
    pub fn eph(&self) -> [u8; 32] {
        self.ctx.ephemeral_public_key()
    }

    /// Decodes the server's `syn`, learning the server's static key.
    pub fn syn(&mut self, syn: &[u8]) -> Result<Vec<u8>> {
        trace!("ClientHandshake::syn kdf_id={}", SYN_KDF_ID);
        self.ctx.open(syn, SYN_KDF_ID)
    }

    /// Sends the client's static key and payload, encrypted under
    /// `kdf_id = 2`.
    pub fn ack(&mut self, data: &[u8], pad_len: u32) -> Result<Vec<u8>> {
        trace!("ClientHandshake::ack kdf_id={}", ACK_KDF_ID);
        self.ctx.shut(data, ACK_KDF_ID, pad_len)
    }

    /// The server's static public key, available once `syn` succeeds.
    pub fn peer_public_key(&self) -> [u8; 32] {
        self.ctx.peer_public_key()
    }

    /// The evolved chain variable, for deriving post-handshake transport
    /// keys via `Ciphersuite::derive_cc_cc`.
    pub fn chain_variable(&self) -> &Secret {
        self.ctx.chain_variable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphersuite::Noise255;

    fn run_handshake(
        client_payload: &'static [u8],
        server_greeting: &'static [u8],
    ) -> (ClientHandshake<Noise255>, ServerHandshake<Noise255>, Vec<u8>, Vec<u8>) {
        let client_key = Noise255::new_keypair();
        let server_key = Noise255::new_keypair();

        let mut client = ClientHandshake::<Noise255>::new(client_key);
        let mut server = ServerHandshake::<Noise255>::new(server_key);

        server.eph(PublicKey::from_bytes(client.eph()));

        let syn = server.syn(server_greeting, 0).unwrap();
        let greeting = client.syn(&syn).unwrap();

        let ack = client.ack(client_payload, 0).unwrap();
        let payload = server.ack(&ack).unwrap();

        (client, server, greeting, payload)
    }

    #[test]
    fn full_handshake_exchanges_static_keys_and_payloads() {
        let (client, server, greeting, payload) = run_handshake(b"client says hi", b"server says hi");

        assert_eq!(greeting, b"server says hi");
        assert_eq!(payload, b"client says hi");

        assert_ne!(server.peer_public_key(), [0u8; 32]);
        assert_ne!(client.peer_public_key(), [0u8; 32]);
    }

    #[test]
    fn both_sides_converge_on_the_same_chain_variable() {
        let (client, server, _, _) = run_handshake(b"a", b"b");
        assert_eq!(client.chain_variable().read(), server.chain_variable().read());
    }

    #[test]
    fn client_ack_before_reading_syn_fails_counter_check() {
        let client_key = Noise255::new_keypair();
        let server_key = Noise255::new_keypair();
        let mut client = ClientHandshake::<Noise255>::new(client_key);
        let mut server = ServerHandshake::<Noise255>::new(server_key);

        server.eph(PublicKey::from_bytes(client.eph()));
        let result = client.ack(b"too early", 0);
        assert!(result.is_err());
    }

    #[test]
    fn tampered_syn_fails_with_mac_mismatch() {
        use crate::error::NoiseError;

        let client_key = Noise255::new_keypair();
        let server_key = Noise255::new_keypair();
        let mut client = ClientHandshake::<Noise255>::new(client_key);
        let mut server = ServerHandshake::<Noise255>::new(server_key);

        server.eph(PublicKey::from_bytes(client.eph()));
        let mut syn = server.syn(b"greeting", 0).unwrap();
        syn[40] ^= 1;

        let result = client.syn(&syn);
        assert!(matches!(result, Err(NoiseError::MacMismatch)));
    }
}
