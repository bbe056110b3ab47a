/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Command and response parameter structures for a handful of TPM 2.0 commands

use crate::tpm_structure::{CmdStructure, ReqStructure, RespStructure};
use crate::tpm_types::*;

tpm_struct! {
    /// <summary> This command returns various information regarding the TPM and its current
    /// state. </summary>
    pub struct TPM2_GetCapability_REQUEST {
        /// Group selection; determines the format of the response
        capability: TPM_CAP => int(U32),
        /// Further definition of information
        property: u32 => int(U32),
        /// Number of properties of the indicated type to return
        propertyCount: u32 => int(U32),
    }
}

impl TPM2_GetCapability_REQUEST {
    pub fn new(capability: TPM_CAP, property: u32, property_count: u32) -> Self {
        TPM2_GetCapability_REQUEST {
            capability,
            property,
            propertyCount: property_count,
        }
    }
}

impl CmdStructure for TPM2_GetCapability_REQUEST {}

impl ReqStructure for TPM2_GetCapability_REQUEST {
    fn get_handles(&self) -> Vec<TPM_HANDLE> {
        vec![]
    }
}

tpm_struct! {
    /// <summary> This command returns various information regarding the TPM and its current
    /// state. </summary>
    pub struct GetCapabilityResponse {
        /// Flag to indicate if there are more values of this type (YES/NO)
        moreData: u8 => int(U8),
        /// The capability data
        capabilityData: TPMS_CAPABILITY_DATA => structure,
    }
}

impl CmdStructure for GetCapabilityResponse {}

impl RespStructure for GetCapabilityResponse {}

tpm_struct! {
    /// <summary> This command allows access to the public area of a loaded object. </summary>
    pub struct TPM2_ReadPublic_REQUEST [handles = 1] {
        /// TPM handle of an object
        /// Auth Index: None
        objectHandle: TPM_HANDLE => int(U32),
    }
}

impl TPM2_ReadPublic_REQUEST {
    pub fn new(object_handle: &TPM_HANDLE) -> Self {
        TPM2_ReadPublic_REQUEST {
            objectHandle: object_handle.clone(),
        }
    }
}

impl CmdStructure for TPM2_ReadPublic_REQUEST {}

impl ReqStructure for TPM2_ReadPublic_REQUEST {
    fn get_handles(&self) -> Vec<TPM_HANDLE> {
        vec![self.objectHandle.clone()]
    }
}

tpm_struct! {
    /// <summary> This command allows access to the public area of a loaded object. </summary>
    pub struct ReadPublicResponse {
        /// Structure containing the public area of an object
        outPublic: TPMT_PUBLIC => sized_structure(U16),
        /// Name of the object
        name: Vec<u8> => sized(U16),
        /// The Qualified Name of the object
        qualifiedName: Vec<u8> => sized(U16),
    }
}

impl CmdStructure for ReadPublicResponse {}

impl RespStructure for ReadPublicResponse {}

tpm_struct! {
    /// <summary> This command returns the values of all PCR specified in pcrSelectionIn.
    /// </summary>
    pub struct TPM2_PCR_Read_REQUEST {
        /// The selection of PCR to read
        pcrSelectionIn: TPML_PCR_SELECTION => structure,
    }
}

impl TPM2_PCR_Read_REQUEST {
    pub fn new(pcr_selection_in: &[TPMS_PCR_SELECTION]) -> Self {
        TPM2_PCR_Read_REQUEST {
            pcrSelectionIn: TPML_PCR_SELECTION {
                pcrSelections: pcr_selection_in.to_vec(),
            },
        }
    }
}

impl CmdStructure for TPM2_PCR_Read_REQUEST {}

impl ReqStructure for TPM2_PCR_Read_REQUEST {
    fn get_handles(&self) -> Vec<TPM_HANDLE> {
        vec![]
    }
}

tpm_struct! {
    /// <summary> This command returns the values of all PCR specified in pcrSelectionIn.
    /// </summary>
    pub struct PCR_ReadResponse {
        /// The current value of the PCR update counter
        pcrUpdateCounter: u32 => int(U32),
        /// The PCR in the returned list
        pcrSelectionOut: TPML_PCR_SELECTION => structure,
        /// The contents of the PCR indicated in pcrSelectOut->pcrSelection[] as tagged digests
        pcrValues: Vec<TPM2B_DIGEST> => array(U32),
    }
}

impl CmdStructure for PCR_ReadResponse {}

impl RespStructure for PCR_ReadResponse {}

tpm_struct! {
    /// <summary> This command uses loaded keys to validate a signature on a message with the
    /// message digest passed to the TPM. </summary>
    pub struct TPM2_VerifySignature_REQUEST [handles = 1] {
        /// Handle of public key that will be used in the validation
        /// Auth Index: None
        keyHandle: TPM_HANDLE => int(U32),
        /// Digest of the signed message
        digest: Vec<u8> => sized(U16),
        /// Signature to be tested
        signature: TPMT_SIGNATURE => structure,
    }
}

impl TPM2_VerifySignature_REQUEST {
    pub fn new(key_handle: &TPM_HANDLE, digest: &[u8], signature: TPMU_SIGNATURE) -> Self {
        TPM2_VerifySignature_REQUEST {
            keyHandle: key_handle.clone(),
            digest: digest.to_vec(),
            signature: TPMT_SIGNATURE::new(signature),
        }
    }
}

impl CmdStructure for TPM2_VerifySignature_REQUEST {}

impl ReqStructure for TPM2_VerifySignature_REQUEST {
    fn get_handles(&self) -> Vec<TPM_HANDLE> {
        vec![self.keyHandle.clone()]
    }
}

tpm_struct! {
    /// <summary> This command uses loaded keys to validate a signature on a message with the
    /// message digest passed to the TPM. </summary>
    pub struct VerifySignatureResponse {
        validation: TPMT_TK_VERIFIED => structure,
    }
}

impl CmdStructure for VerifySignatureResponse {}

impl RespStructure for VerifySignatureResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TpmError;
    use crate::tpm_buffer::{TpmBuffer, TpmReader};
    use crate::tpm_marshaller::*;
    use crate::tpm_structure::{SessEncInfo, TpmStructure};

    #[test]
    fn test_get_capability_request() {
        let req = TPM2_GetCapability_REQUEST::new(TPM_CAP::TPM_PROPERTIES, 0x100, 8);
        assert_eq!(req.num_handles(), 0);
        assert_eq!(req.sess_enc_info(), SessEncInfo::default());
        #[rustfmt::skip]
        assert_eq!(req.to_bytes().unwrap(), vec![
            0x00, 0x00, 0x00, 0x06,
            0x00, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x00, 0x08,
        ]);
    }

    #[test]
    fn test_get_capability_response() {
        #[rustfmt::skip]
        let bytes = [
            0x00,                   // moreData
            0x00, 0x00, 0x00, 0x06, // TPM_PROPERTIES
            0x00, 0x00, 0x00, 0x01, // count
            0x00, 0x00, 0x01, 0x05, 0x49, 0x42, 0x4D, 0x00,
        ];
        let resp = GetCapabilityResponse::from_bytes(&bytes).unwrap();
        assert_eq!(resp.moreData, 0);
        match &resp.capabilityData.data {
            TPMU_CAPABILITIES::tpmProperties(props) => {
                assert_eq!(props.tpmProperty.len(), 1);
                assert_eq!(props.tpmProperty[0].property, 0x105);
                assert_eq!(props.tpmProperty[0].value, 0x4942_4D00);
            }
            other => panic!("unexpected capability data {:?}", other),
        }
    }

    #[test]
    fn test_read_public_params_skip_handle() {
        let req = TPM2_ReadPublic_REQUEST::new(&TPM_HANDLE::persistent(1));
        assert_eq!(req.num_handles(), 1);
        assert_eq!(req.get_handles(), vec![TPM_HANDLE::new(0x8100_0001)]);

        let mut buf = TpmBuffer::new();
        write_params(&mut buf, &req).unwrap();
        assert!(buf.is_empty());
        assert_eq!(req.to_bytes().unwrap(), vec![0x81, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_read_public_response_sess_enc_info() {
        let resp = ReadPublicResponse::default();
        assert_eq!(
            resp.sess_enc_info(),
            SessEncInfo {
                size_len: 2,
                val_len: 1
            }
        );
        assert_eq!(resp.get_handle(), TPM_HANDLE::default());
    }

    #[test]
    fn test_pcr_read_round_trip() {
        let req = TPM2_PCR_Read_REQUEST::new(&[TPMS_PCR_SELECTION::new(TPM_ALG_ID::SHA256, &[0])]);
        assert_eq!(
            req.to_bytes().unwrap(),
            vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x0B, 0x03, 0x01, 0x00, 0x00]
        );

        let resp = PCR_ReadResponse {
            pcrUpdateCounter: 42,
            pcrSelectionOut: req.pcrSelectionIn.clone(),
            pcrValues: vec![TPM2B_DIGEST::new(&[0xAB; 32])],
        };
        let bytes = resp.to_bytes().unwrap();
        assert_eq!(bytes.len(), 4 + 10 + 4 + 2 + 32);
        assert_eq!(PCR_ReadResponse::from_bytes(&bytes).unwrap(), resp);
    }

    #[test]
    fn test_verify_signature_request() {
        let sig = TPMU_SIGNATURE::ecdsa(TPMS_SIGNATURE_ECDSA {
            hash: TPM_ALG_ID::SHA256,
            signatureR: vec![0xAA],
            signatureS: vec![0xBB],
        });
        let req = TPM2_VerifySignature_REQUEST::new(&TPM_HANDLE::persistent(2), &[0x01, 0x02], sig);
        assert_eq!(
            req.sess_enc_info(),
            SessEncInfo {
                size_len: 2,
                val_len: 1
            }
        );

        let mut buf = TpmBuffer::new();
        write_params(&mut buf, &req).unwrap();
        #[rustfmt::skip]
        assert_eq!(buf.trim(), &[
            0x00, 0x02, 0x01, 0x02, // digest
            0x00, 0x18,             // sigAlg = ECDSA
            0x00, 0x0B,             // hash
            0x00, 0x01, 0xAA,
            0x00, 0x01, 0xBB,
        ][..]);

        // Parameters read back into a request whose handle is supplied separately
        let mut decoded = TPM2_VerifySignature_REQUEST::default();
        let mut reader = TpmReader::new(buf.trim());
        read_params(&mut reader, &mut decoded).unwrap();
        assert!(reader.is_at_end());
        assert_eq!(decoded.digest, req.digest);
        assert_eq!(decoded.signature, req.signature);
        assert_eq!(decoded.keyHandle, TPM_HANDLE::default());
    }

    #[test]
    fn test_verify_signature_response_truncated() {
        let bytes = [0x80, 0x22, 0x40, 0x00, 0x00, 0x07, 0x00, 0x04, 0x01];
        assert_eq!(
            VerifySignatureResponse::from_bytes(&bytes),
            Err(TpmError::TruncatedSizedField {
                offset: 8,
                declared: 4,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_command_schemas_validate() {
        let schemas = [
            TPM2_GetCapability_REQUEST::default().schema(),
            GetCapabilityResponse::default().schema(),
            TPM2_ReadPublic_REQUEST::default().schema(),
            ReadPublicResponse::default().schema(),
            TPM2_PCR_Read_REQUEST::default().schema(),
            PCR_ReadResponse::default().schema(),
            TPM2_VerifySignature_REQUEST::default().schema(),
            VerifySignatureResponse::default().schema(),
        ];
        for schema in schemas {
            assert!(schema.validate().is_ok(), "{}", schema.name);
        }
    }
}
