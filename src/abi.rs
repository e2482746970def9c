// 3.0: wire contract with the margin protocol. function names, argument order and the
// address / uint256 / uint32 grouping below must match the deployed contract exactly.

use alloy_sol_types::sol;

sol! {
    #[sol(all_derives)]
    interface IMargin {
        // state changing

        function openPosition(
            address[11] addresses,
            uint256[10] values256,
            uint32[4] values32,
            bytes signature,
            bool depositInHeldToken,
            bytes orderData
        ) external returns (bytes32);

        function openWithoutCounterparty(
            address[4] addresses,
            uint256[3] values256,
            uint32[4] values32
        ) external returns (bytes32);

        function increasePosition(
            bytes32 positionId,
            address[7] addresses,
            uint256[8] values256,
            uint32[2] values32,
            bool depositInHeldToken,
            bytes signature,
            bytes orderData
        ) external returns (uint256);

        function increaseWithoutCounterparty(
            bytes32 positionId,
            uint256 principalToAdd
        ) external returns (uint256);

        function closePosition(
            bytes32 positionId,
            uint256 requestedCloseAmount,
            address payoutRecipient,
            address exchangeWrapper,
            bool payoutInHeldToken,
            bytes orderData
        ) external returns (uint256, uint256, uint256);

        function closePositionDirectly(
            bytes32 positionId,
            uint256 requestedCloseAmount,
            address payoutRecipient
        ) external returns (uint256, uint256, uint256);

        function closeWithoutCounterparty(
            bytes32 positionId,
            uint256 requestedCloseAmount,
            address payoutRecipient
        ) external returns (uint256, uint256);

        function cancelLoanOffering(
            address[9] addresses,
            uint256[7] values256,
            uint32[4] values32,
            uint256 cancelAmount
        ) external returns (uint256);

        function marginCall(bytes32 positionId, uint256 requiredDeposit) external;

        function cancelMarginCall(bytes32 positionId) external;

        function forceRecoverCollateral(bytes32 positionId, address recipient) external returns (uint256);

        function depositCollateral(bytes32 positionId, uint256 depositAmount) external;

        function transferLoan(bytes32 positionId, address who) external;

        function transferPosition(bytes32 positionId, address who) external;

        // constant

        function getPosition(bytes32 positionId) external view returns (address[4], uint256[2], uint32[6]);

        function containsPosition(bytes32 positionId) external view returns (bool);

        function isPositionCalled(bytes32 positionId) external view returns (bool);

        function isPositionClosed(bytes32 positionId) external view returns (bool);

        function getTotalOwedTokenRepaidToLender(bytes32 positionId) external view returns (uint256);

        function getPositionBalance(bytes32 positionId) external view returns (uint256);

        function getTimeUntilInterestIncrease(bytes32 positionId) external view returns (uint256);

        function getPositionOwedAmount(bytes32 positionId) external view returns (uint256);

        function getPositionOwedAmountAtTime(
            bytes32 positionId,
            uint256 principalToClose,
            uint32 timestamp
        ) external view returns (uint256);

        function getLenderAmountForIncreasePositionAtTime(
            bytes32 positionId,
            uint256 principalToAdd,
            uint32 timestamp
        ) external view returns (uint256);

        function getLoanUnavailableAmount(bytes32 loanHash) external view returns (uint256);

        function getLoanFilledAmount(bytes32 loanHash) external view returns (uint256);

        function getLoanCanceledAmount(bytes32 loanHash) external view returns (uint256);

        function getLoanNumber(bytes32 loanHash) external view returns (uint256);

        function isLoanApproved(bytes32 loanHash) external view returns (bool);

        // events

        event PositionOpened(
            bytes32 indexed positionId,
            address indexed trader,
            address indexed lender,
            bytes32 loanHash,
            address owedToken,
            address heldToken,
            address loanFeeRecipient,
            uint256 principal,
            uint256 heldTokenFromSell,
            uint256 depositAmount,
            uint256 interestRate,
            uint32 callTimeLimit,
            uint32 maxDuration,
            bool depositInHeldToken
        );

        event PositionClosed(
            bytes32 indexed positionId,
            address indexed closer,
            address indexed payoutRecipient,
            uint256 closeAmount,
            uint256 remainingAmount,
            uint256 owedTokenPaidToLender,
            uint256 payoutAmount,
            uint256 buybackCostInHeldToken,
            bool payoutInHeldToken
        );
    }
}
