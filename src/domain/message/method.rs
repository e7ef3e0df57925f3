//! Known Omnibridge mediator methods

use alloy_primitives::hex;
use serde::Serialize;

/// Mediator entry points that carry a cross-chain recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BridgeMethod {
    HandleNativeTokens,
    HandleNativeTokensAndCall,
    HandleBridgedTokens,
    HandleBridgedTokensAndCall,
    DeployAndHandleBridgedTokens,
    DeployAndHandleBridgedTokensAndCall,
}

impl BridgeMethod {
    pub const ALL: [BridgeMethod; 6] = [
        BridgeMethod::HandleNativeTokens,
        BridgeMethod::HandleNativeTokensAndCall,
        BridgeMethod::HandleBridgedTokens,
        BridgeMethod::HandleBridgedTokensAndCall,
        BridgeMethod::DeployAndHandleBridgedTokens,
        BridgeMethod::DeployAndHandleBridgedTokensAndCall,
    ];

    /// Exact-byte lookup; no normalization is applied to the selector
    pub fn from_selector(selector: [u8; 4]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.selector() == selector)
    }

    pub const fn selector(self) -> [u8; 4] {
        match self {
            BridgeMethod::HandleNativeTokens => hex!("272255bb"),
            BridgeMethod::HandleNativeTokensAndCall => hex!("867f7a4d"),
            BridgeMethod::HandleBridgedTokens => hex!("125e4cfb"),
            BridgeMethod::HandleBridgedTokensAndCall => hex!("c5345761"),
            BridgeMethod::DeployAndHandleBridgedTokens => hex!("2ae87cdd"),
            BridgeMethod::DeployAndHandleBridgedTokensAndCall => hex!("d522cfd7"),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BridgeMethod::HandleNativeTokens => "handleNativeTokens",
            BridgeMethod::HandleNativeTokensAndCall => "handleNativeTokensAndCall",
            BridgeMethod::HandleBridgedTokens => "handleBridgedTokens",
            BridgeMethod::HandleBridgedTokensAndCall => "handleBridgedTokensAndCall",
            BridgeMethod::DeployAndHandleBridgedTokens => "deployAndHandleBridgedTokens",
            BridgeMethod::DeployAndHandleBridgedTokensAndCall => {
                "deployAndHandleBridgedTokensAndCall"
            }
        }
    }

    /// Canonical Solidity signature the selector is derived from
    pub const fn signature(self) -> &'static str {
        match self {
            BridgeMethod::HandleNativeTokens => "handleNativeTokens(address,address,uint256)",
            BridgeMethod::HandleNativeTokensAndCall => {
                "handleNativeTokensAndCall(address,address,uint256,bytes)"
            }
            BridgeMethod::HandleBridgedTokens => "handleBridgedTokens(address,address,uint256)",
            BridgeMethod::HandleBridgedTokensAndCall => {
                "handleBridgedTokensAndCall(address,address,uint256,bytes)"
            }
            BridgeMethod::DeployAndHandleBridgedTokens => {
                "deployAndHandleBridgedTokens(address,string,string,uint8,address,uint256)"
            }
            BridgeMethod::DeployAndHandleBridgedTokensAndCall => {
                "deployAndHandleBridgedTokensAndCall(address,string,string,uint8,address,uint256,bytes)"
            }
        }
    }

    /// 1-based index of the 32-byte argument slot holding the receiver
    ///
    /// `(token, receiver, value, ..)` for the handle* family,
    /// `(token, name, symbol, decimals, receiver, value, ..)` for deployAndHandle*.
    pub const fn recipient_slot(self) -> usize {
        match self {
            BridgeMethod::HandleNativeTokens
            | BridgeMethod::HandleNativeTokensAndCall
            | BridgeMethod::HandleBridgedTokens
            | BridgeMethod::HandleBridgedTokensAndCall => 2,
            BridgeMethod::DeployAndHandleBridgedTokens
            | BridgeMethod::DeployAndHandleBridgedTokensAndCall => 5,
        }
    }

    pub fn selector_hex(self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }
}

impl std::fmt::Display for BridgeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
