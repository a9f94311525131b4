//! ABI bindings for the protocol contracts the configurator drives.
//!
//! Only the entry points used here are declared.

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    interface ISocket {
        /// Emitted once a switchboard is registered for a sibling chain.
        event SwitchboardAdded(
            address switchBoard,
            uint256 siblingChainSlug,
            address capacitor,
            address decapacitor,
            uint256 maxPacketLength,
            uint256 capacitorType
        );

        /// Registers `switchBoardAddress` for `siblingChainSlug`, deploying a capacitor
        /// and decapacitor pair for it.
        function registerSwitchBoard(
            address switchBoardAddress,
            uint32 siblingChainSlug,
            uint32 maxPacketLength,
            uint32 capacitorType
        ) external;
    }

    /// Fast and optimistic switchboards share the execution-overhead registry; the
    /// attester functions only exist on the fast switchboard.
    #[sol(rpc)]
    interface ISwitchboard {
        function nextNonce(address signer) external view returns (uint256);
        function executionOverhead(uint256 dstChainSlug) external view returns (uint256);
        function setExecutionOverhead(
            uint256 nonce,
            uint256 dstChainSlug,
            uint256 executionOverhead,
            bytes calldata signature
        ) external;

        function attestGasLimit(uint256 dstChainSlug) external view returns (uint256);
        function setAttestGasLimit(
            uint256 nonce,
            uint256 dstChainSlug,
            uint256 attestGasLimit,
            bytes calldata signature
        ) external;

        function isAttester(address attester, uint256 dstChainSlug) external view returns (bool);
        function grantAttesterRole(uint256 dstChainSlug, address attester) external;
    }

    #[sol(rpc)]
    interface ITransmitManager {
        function nextNonce(address signer) external view returns (uint256);
        function proposeGasLimit(uint256 dstChainSlug) external view returns (uint256);
        function setProposeGasLimit(
            uint256 nonce,
            uint256 dstChainSlug,
            uint256 proposeGasLimit,
            bytes calldata signature
        ) external;
    }

    #[sol(rpc)]
    interface IPolygonL1Switchboard {
        function fxChildTunnel() external view returns (address);
        function setFxChildTunnel(address fxChildTunnel) external;
    }

    #[sol(rpc)]
    interface IPolygonL2Switchboard {
        function fxRootTunnel() external view returns (address);
        function setFxRootTunnel(address fxRootTunnel) external;
    }

    /// Arbitrum (both sides) and Optimism switchboards.
    #[sol(rpc)]
    interface INativeSwitchboard {
        function remoteNativeSwitchboard() external view returns (address);
        function updateRemoteNativeSwitchboard(address remoteNativeSwitchboard) external;
    }

    #[sol(rpc)]
    interface ISocketBatcher {
        struct UpdateRequest {
            uint256 nonce;
            uint256 dstChainSlug;
            uint256 value;
            bytes signature;
        }

        function setProposeGasLimits(
            UpdateRequest[] calldata requests,
            address transmitManager
        ) external;
        function setAttestGasLimits(
            UpdateRequest[] calldata requests,
            address fastSwitchboard
        ) external;
        function setExecutionOverheads(
            UpdateRequest[] calldata requests,
            address switchboard
        ) external;
    }
}
