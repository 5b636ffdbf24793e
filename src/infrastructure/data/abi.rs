// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ISubscription {
        function contractURI() external view returns (string memory);
        function tokenURI(uint256 tokenId) external view returns (string memory);
        function totalSupply() external view returns (uint256);
        function tokenByIndex(uint256 index) external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);

        function mint(uint256 amount, string calldata message) external returns (uint256);
        function renew(uint256 tokenId, uint256 amount, string calldata message) external;
        function withdraw(uint256 tokenId, uint256 amount) external;
        function cancel(uint256 tokenId) external;
        function tip(uint256 tokenId, uint256 amount, string calldata message) external;
        function claim() external;
        function setFlags(uint256 flags) external;
        function setDescription(string calldata description) external;
        function setImage(string calldata image) external;
        function setExternalUrl(string calldata externalUrl) external;

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        event SubscriptionRenewed(
            uint256 indexed tokenId,
            uint256 addedAmount,
            uint256 deposited,
            address indexed depositor,
            string message
        );
        event SubscriptionWithdrawn(uint256 indexed tokenId, uint256 removedAmount, uint256 refunded);
        event Tipped(uint256 indexed tokenId, uint256 amount, address indexed sender, string message);
        event FundsClaimed(uint256 amount, uint256 totalClaimed);
        event FlagsUpdated(uint256 flags);
        event DescriptionUpdated(string description);
        event ImageUpdated(string image);
        event ExternalUrlUpdated(string externalUrl);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);

        event Approval(address indexed owner, address indexed spender, uint256 value);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC6551Registry {
        function createAccount(address implementation, bytes32 salt, uint256 chainId, address tokenContract, uint256 tokenId) external returns (address account);
        function account(address implementation, bytes32 salt, uint256 chainId, address tokenContract, uint256 tokenId) external view returns (address account);

        event ERC6551AccountCreated(
            address account,
            address indexed implementation,
            bytes32 salt,
            uint256 chainId,
            address indexed tokenContract,
            uint256 indexed tokenId
        );
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC6551Account {
        function token() external view returns (uint256 chainId, address tokenContract, uint256 tokenId);
        function state() external view returns (uint256);
        function isValidSigner(address signer, bytes calldata context) external view returns (bytes4 magicValue);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC6551Executable {
        function execute(address to, uint256 value, bytes calldata data, uint8 operation) external payable returns (bytes memory);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface AggregatorV3Interface {
        function latestRoundData() external view returns (uint80 roundId, int256 answer, uint256 startedAt, uint256 updatedAt, uint80 answeredInRound);
        function decimals() external view returns (uint8);
    }
}
